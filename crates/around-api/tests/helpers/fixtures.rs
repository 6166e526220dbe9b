use axum_test::multipart::{MultipartForm, Part};

/// Minimal bytes with a PNG signature; content is never decoded.
pub fn png_bytes() -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    data.extend_from_slice(b"around test image");
    data
}

pub fn jpeg_bytes() -> Vec<u8> {
    let mut data = vec![0xff, 0xd8, 0xff, 0xe0];
    data.extend_from_slice(b"around test image");
    data
}

/// Full create-post form with the attachment named `filename`.
pub fn post_form(message: &str, lat: f64, lon: f64, filename: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new()
        .add_text("message", message.to_string())
        .add_text("lat", lat.to_string())
        .add_text("lon", lon.to_string())
        .add_part(
            "image",
            Part::bytes(bytes::Bytes::from(data))
                .file_name(filename.to_string())
                .mime_type("application/octet-stream"),
        )
}
