//! Tests for Archive II volume and LDM record decoding.

use radar_common::{Gate, Moment};
use radar_decode::archive2::{decode_ldm_record, Archive2, VOLUME_HEADER_LEN};
use radar_decode::DecodeError;
use test_utils::archive2::{encode_ldm_record, standard_ref_raw, sweep};
use test_utils::{assert_approx_eq, Archive2Builder, SyntheticMoment};

// ============================================================================
// Full volume extraction
// ============================================================================

#[test]
fn test_extract_standard_volume() {
    let data = Archive2Builder::standard("KOKX").build();
    let volume = Archive2::extract(&data).unwrap();

    assert_eq!(volume.header.icao, "KOKX");
    assert_eq!(volume.header.tape_filename, "AR2V0006.");
    assert_eq!(volume.records.len(), 6);
    assert_eq!(volume.elevation_scans.len(), 3);
    assert_eq!(volume.radial_count(), 24);
    for elevation in 1..=3 {
        assert_eq!(volume.elevation(elevation).unwrap().len(), 8);
    }
}

#[test]
fn test_extract_reads_vcp_from_metadata_record() {
    let data = Archive2Builder::standard("KOKX").build();
    let volume = Archive2::extract(&data).unwrap();

    let vcp = volume.vcp.expect("metadata record carries message 5");
    assert_eq!(vcp.pattern_number, 212);
    assert_eq!(vcp.cuts.len(), 3);
    assert_approx_eq!(vcp.cuts[0].elevation_angle, 0.5, 0.01);
    assert_approx_eq!(vcp.cuts[2].elevation_angle, 2.4, 0.01);
}

#[test]
fn test_record_summaries_match_builder_offsets() {
    let (data, offsets) = Archive2Builder::standard("KOKX").build_with_offsets();
    let volume = Archive2::extract(&data).unwrap();

    assert_eq!(volume.ldm_offsets(), offsets);
    assert_eq!(volume.records[0].offset, VOLUME_HEADER_LEN);
    // Metadata record holds no radials.
    assert!(volume.records[0].elevation_numbers.is_empty());
    // Second radial record straddles elevations 1 and 2.
    assert_eq!(volume.records[2].elevation_numbers, vec![1, 1, 1, 2, 2]);

    let last = volume.records.last().unwrap();
    assert_eq!(last.offset + last.length, data.len());
}

#[test]
fn test_radial_fields_decode() {
    let data = Archive2Builder::standard("KOKX").build();
    let volume = Archive2::extract(&data).unwrap();

    let radial = &volume.elevation(2).unwrap()[3];
    assert_eq!(radial.header.azimuth_number, 4);
    assert_eq!(radial.header.elevation_number, 2);
    assert_approx_eq!(radial.header.elevation_angle, 1.5, 1e-6);
    assert_approx_eq!(radial.header.azimuth_angle, 135.0, 1e-6);
    assert_eq!(radial.header.azimuth_resolution(), 1.0);

    let vol = radial.volume.as_ref().unwrap();
    assert_approx_eq!(vol.lat, 40.865, 1e-4);
    assert_approx_eq!(vol.lon, -72.864, 1e-4);
    assert_eq!(vol.volume_coverage_pattern, 212);

    let rad = radial.radial.as_ref().unwrap();
    assert_approx_eq!(rad.unambiguous_range, 466.0, 1e-3);
    assert_approx_eq!(rad.nyquist_velocity, 26.5, 1e-3);

    let reflectivity = radial.moment(Moment::Reflectivity).unwrap();
    assert_eq!(reflectivity.gate_count, 12);
    assert_eq!(reflectivity.first_gate_range, 2125);
    assert_eq!(reflectivity.gate_interval, 250);

    let raw = standard_ref_raw(2, 3, 4);
    let expected = (raw as f32 - 66.0) / 2.0;
    assert_eq!(reflectivity.gates()[4], Gate::Value(expected));
}

#[test]
fn test_lowest_elevation_lacks_velocity() {
    let data = Archive2Builder::standard("KOKX").build();
    let volume = Archive2::extract(&data).unwrap();

    assert!(volume.elevation(1).unwrap()[0].moment(Moment::Velocity).is_none());
    assert!(volume.elevation(3).unwrap()[0].moment(Moment::Velocity).is_some());
}

#[test]
fn test_half_degree_radials() {
    let radials = sweep(1, 0.5, 4, 1, 3, |_, n| {
        vec![SyntheticMoment::reflectivity(vec![100; n])]
    });
    let data = Archive2Builder::new("KTLX").record(radials).build();
    let volume = Archive2::extract(&data).unwrap();

    assert_eq!(volume.elevation(1).unwrap()[0].header.azimuth_resolution(), 0.5);
    assert!(volume.vcp.is_none());
}

#[test]
fn test_extract_rejects_missing_magic() {
    let mut data = Archive2Builder::standard("KOKX").build();
    data[..4].copy_from_slice(b"XXXX");
    assert!(matches!(
        Archive2::extract(&data),
        Err(DecodeError::InvalidVolumeHeader(_))
    ));
}

#[test]
fn test_extract_truncated_final_record() {
    let mut data = Archive2Builder::standard("KOKX").build();
    data.truncate(data.len() - 10);
    assert!(matches!(
        Archive2::extract(&data),
        Err(DecodeError::Truncated { .. })
    ));
}

// ============================================================================
// Independent record decoding
// ============================================================================

#[test]
fn test_each_record_decodes_alone() {
    let (data, offsets) = Archive2Builder::standard("KOKX").build_with_offsets();

    let mut total = 0;
    for (i, &offset) in offsets.iter().enumerate() {
        let end = offsets.get(i + 1).copied().unwrap_or(data.len());
        let record = decode_ldm_record(&data[offset..end]).unwrap();
        assert_eq!(record.encoded_len, end - offset);
        total += record.radials.len();
    }
    assert_eq!(total, 24);
}

#[test]
fn test_trailing_bytes_are_ignored() {
    let (data, offsets) = Archive2Builder::standard("KOKX").build_with_offsets();
    let alone = decode_ldm_record(&data[offsets[1]..offsets[2]]).unwrap();
    let overrun = decode_ldm_record(&data[offsets[1]..]).unwrap();
    assert_eq!(alone.radials, overrun.radials);
}

#[test]
fn test_negative_control_word() {
    let radials = sweep(1, 0.5, 2, 2, 4, |_, n| {
        vec![SyntheticMoment::reflectivity(vec![80; n])]
    });
    let (data, offsets) = Archive2Builder::new("KOKX").record(radials).build_with_offsets();
    let mut record_bytes = data[offsets[0]..].to_vec();

    let length = i32::from_be_bytes([record_bytes[0], record_bytes[1], record_bytes[2], record_bytes[3]]);
    record_bytes[..4].copy_from_slice(&(-length).to_be_bytes());

    let record = decode_ldm_record(&record_bytes).unwrap();
    assert_eq!(record.radials.len(), 2);
}

#[test]
fn test_record_of_padding_frames() {
    let record = decode_ldm_record(&encode_ldm_record(&[0u8; 2432 * 3])).unwrap();
    assert!(record.radials.is_empty());
    assert!(record.vcp.is_none());
}

// ============================================================================
// Merging
// ============================================================================

#[test]
fn test_add_record_out_of_order_then_sort() {
    let (data, offsets) = Archive2Builder::standard("KOKX").build_with_offsets();
    let full = Archive2::extract(&data).unwrap();

    let mut merged = Archive2::new(full.header.clone());
    for (i, &offset) in offsets.iter().enumerate().rev() {
        let end = offsets.get(i + 1).copied().unwrap_or(data.len());
        merged.add_record(decode_ldm_record(&data[offset..end]).unwrap());
    }
    merged.sort_radials();

    assert_eq!(merged.vcp, full.vcp);
    for elevation in 1..=3 {
        assert_eq!(merged.elevation(elevation), full.elevation(elevation));
    }
}

#[test]
fn test_retain_elevation() {
    let data = Archive2Builder::standard("KOKX").build();
    let mut volume = Archive2::extract(&data).unwrap();
    volume.retain_elevation(2);
    assert_eq!(volume.elevation_scans.len(), 1);
    assert_eq!(volume.radial_count(), 8);

    volume.clear_radials();
    assert_eq!(volume.radial_count(), 0);
    assert!(volume.vcp.is_some());
}
