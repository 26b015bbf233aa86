//! Conversion of decoded volumes and products into [`RadialSet`]s.

use radar_common::{Gate, Moment, Radial, RadialSet, DEFAULT_RADIUS_METERS};

use crate::archive2::Message31;
use crate::error::{DecodeError, DecodeResult};
use crate::level3::Level3Product;

/// Gate spacing assumed when a Level III packet does not declare one, meters.
pub const LEVEL3_DEFAULT_GATE_INTERVAL: f64 = 1000.0;

/// Level III products whose halfword 30 holds the elevation angle (tenths of a degree).
const ELEVATION_BASED_PRODUCTS: [i16; 16] = [
    19, 20, 25, 27, 28, 30, 56, 94, 99, 159, 161, 163, 165, 181, 182, 186,
];

/// Build a sweep from the Message 31 radials of one elevation.
///
/// Radials that lack the requested moment are skipped. If none carry it the
/// sweep cannot be built.
pub fn radial_set_from_level2(radials: &[Message31], moment: Moment) -> DecodeResult<RadialSet> {
    let first = radials.first().ok_or(DecodeError::EmptyElevation(0))?;
    let elevation_number = first.header.elevation_number;

    let (lat, lon) = radials
        .iter()
        .find_map(|m| m.volume.as_ref())
        .map(|v| (v.lat as f64, v.lon as f64))
        .unwrap_or((0.0, 0.0));

    let converted: Vec<Radial> = radials
        .iter()
        .filter_map(|m| {
            let data = m.moment(moment)?;
            Some(Radial {
                azimuth_angle: m.header.azimuth_angle as f64,
                azimuth_width: m.header.azimuth_resolution(),
                start_range: data.first_gate_range as f64,
                gate_interval: data.gate_interval as f64,
                gates: data.gates(),
            })
        })
        .collect();

    if converted.is_empty() {
        return Err(DecodeError::MomentNotAvailable {
            moment: moment.to_string(),
            elevation: elevation_number,
        });
    }

    Ok(RadialSet {
        lat,
        lon,
        radius: DEFAULT_RADIUS_METERS,
        elevation_angle: first.header.elevation_angle as f64,
        radials: converted,
    })
}

/// Build a sweep from a Level III product. Color index 0 means no data.
pub fn radial_set_from_level3(product: &Level3Product) -> RadialSet {
    let (lat, lon, elevation_angle) = match &product.product_description {
        Some(pd) => {
            let elevation = if ELEVATION_BASED_PRODUCTS.contains(&pd.code) {
                pd.product_dependent_30 as f64 / 10.0
            } else {
                0.0
            };
            (pd.lat as f64 / 1000.0, pd.lon as f64 / 1000.0, elevation)
        }
        None => (0.0, 0.0, 0.0),
    };

    // The packet scale factor holds the bin size in meters when set.
    let (gate_interval, first_bin) = match &product.radial_packet_header {
        Some(packet) if packet.scale_factor > 0 => {
            (packet.scale_factor as f64, packet.first_range_bin as f64)
        }
        Some(packet) => (LEVEL3_DEFAULT_GATE_INTERVAL, packet.first_range_bin as f64),
        None => (LEVEL3_DEFAULT_GATE_INTERVAL, 0.0),
    };

    let radials = product
        .radials
        .iter()
        .map(|radial| Radial {
            azimuth_angle: radial.header.angle_start as f64 / 10.0,
            azimuth_width: radial.header.angle_delta as f64 / 10.0,
            start_range: first_bin * gate_interval,
            gate_interval,
            gates: radial
                .data
                .iter()
                .map(|&v| if v == 0 { Gate::NoData } else { Gate::Value(v as f32) })
                .collect(),
        })
        .collect();

    RadialSet {
        lat,
        lon,
        radius: DEFAULT_RADIUS_METERS,
        elevation_angle,
        radials,
    }
}
