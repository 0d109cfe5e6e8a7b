use super::*;

fn request(title: &str, price: f64, images: usize) -> GenerationRequest {
    GenerationRequest {
        title: title.to_string(),
        price,
        images: (0..images)
            .map(|i| SourceImage {
                mime_type: "image/png".into(),
                bytes: vec![i as u8; 4],
            })
            .collect(),
    }
}

#[test]
fn validate_accepts_zero_price() {
    request("Free Samples", 0.0, 1).validate().expect("valid");
}

#[test]
fn validate_rejects_missing_inputs() {
    for bad in [
        request("  ", 10.0, 1),
        request("Burger", f64::NAN, 1),
        request("Burger", -1.0, 1),
        request("Burger", 10.0, 0),
    ] {
        let err = bad.validate().expect_err("should be rejected");
        assert!(matches!(err, GenerationError::InvalidRequest(_)), "{err:?}");
    }
}

#[tokio::test]
async fn missing_generator_is_unavailable_for_valid_requests() {
    let err = MissingImageGenerator
        .generate(request("Burger", 10.0, 1))
        .await
        .expect_err("no backend");
    assert!(matches!(err, GenerationError::Unavailable));
}

#[test]
fn user_message_falls_back_for_empty_remote_message() {
    let err = GenerationError::Remote {
        status: 500,
        message: " ".into(),
    };
    assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);

    let err = GenerationError::Remote {
        status: 429,
        message: "Quota exceeded".into(),
    };
    assert_eq!(err.user_message(), "Quota exceeded");
}

#[test]
fn user_message_includes_model_text_when_no_image() {
    let err = GenerationError::NoImage {
        text: Some("I cannot draw that".into()),
    };
    assert_eq!(
        err.user_message(),
        "The model did not return an image: I cannot draw that"
    );
}

#[test]
fn decode_data_url_splits_mime_and_payload() {
    let url = to_data_url("image/jpeg", b"\xff\xd8\xff");
    assert_eq!(url, "data:image/jpeg;base64,/9j/");
    let (mime, bytes) = decode_data_url(&url).expect("decodes");
    assert_eq!(mime, "image/jpeg");
    assert_eq!(bytes, b"\xff\xd8\xff");

    assert!(decode_data_url("https://picsum.photos/seed/burger/600/600").is_none());
    assert!(decode_data_url("data:image/png,plain").is_none());
}
