pub mod ingest;

pub use ingest::{
    ingest_bytes, ingest_data_uri, ingest_file, normalize_image_mime, sniff_mime, ImageAsset,
    MAX_INLINE_BYTES,
};
