//! Decoders for NEXRAD radar data.
//!
//! Two wire formats are supported:
//! - Archive II (Level II) volumes: a 24-byte volume header followed by
//!   bzip2-compressed LDM records, each holding a run of radial messages.
//! - Level III products: a WMO text header, fixed-layout product records and
//!   a (possibly bzip2-compressed) symbology block of radial packets.
//!
//! The [`normalize`] module converts both into the canonical
//! [`radar_common::RadialSet`] representation.

pub mod archive2;
pub mod cursor;
pub mod error;
pub mod level3;
pub mod normalize;

pub use archive2::{decode_ldm_record, Archive2, LdmRecord, Message31, RecordSummary};
pub use error::{DecodeError, DecodeResult};
pub use level3::{Level3Product, RadialDecodeStatus};
