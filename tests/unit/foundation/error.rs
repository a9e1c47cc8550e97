use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ThumbError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ThumbError::edit("x").to_string().contains("edit error:"));
    assert!(
        ThumbError::condition("x")
            .to_string()
            .contains("condition error:")
    );
    assert!(
        ThumbError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ThumbError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn serde_json_errors_map_to_serde_variant() {
    let err: ThumbError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, ThumbError::Serde(_)));
}
