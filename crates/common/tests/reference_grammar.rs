use outline_common::nested::NestedOutline;
use outline_common::path::{classify, depth, normalize, Reference};
use outline_common::types::NodeKind;
use proptest::prelude::*;

#[test]
fn references_at_the_api_boundary() {
    let cases = [
        ("51", Reference::GlobalIndex(51)),
        ("c51", Reference::GlobalIndex(51)),
        ("/v1/a1/p1/c51", Reference::Path("/v1/a1/p1/c51".into())),
        ("v1/a1/", Reference::Path("/v1/a1".into())),
        ("/", Reference::Path("/".into())),
        ("chapter", Reference::Path("/chapter".into())),
    ];
    for (input, expected) in cases {
        assert_eq!(Reference::parse(input), expected, "input {input:?}");
    }
}

#[test]
fn index_too_large_for_u32_is_a_path() {
    let reference = Reference::parse("99999999999");
    assert_eq!(reference.as_path(), Some("/99999999999"));
    assert_eq!(classify(reference.as_path().unwrap()), None);
}

#[test]
fn nested_fixture_counts() {
    let outline = NestedOutline::from_json_str(
        r#"{"volumes":[{"volume":"V","acts":[{"act_name":"A","plot_points":[
            {"plot_point_name":"P1","chapters":[{"chapter_name":"x","chapter_index":1}]},
            {"plot_point_name":"P2","chapters":[{"chapter_name":"y","chapter_index":2},
                                                {"chapter_name":"z","chapter_index":3}]}
        ]}]}]}"#,
    )
    .unwrap();
    assert_eq!(outline.chapter_count(), 3);
    assert_eq!(outline.volumes[0].acts[0].plot_points[1].plot_point_name, "P2");
}

proptest! {
    #[test]
    fn normalize_is_idempotent(raw in "[/va-z0-9]{0,24}") {
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(once.starts_with('/'));
        prop_assert!(once == "/" || !once.ends_with('/'));
    }

    #[test]
    fn index_references_display_with_prefix(index in 0u32..1_000_000) {
        let reference = Reference::parse(&index.to_string());
        prop_assert_eq!(reference.to_string(), format!("c{index}"));
        prop_assert_eq!(Reference::parse(&reference.to_string()), reference);
    }

    #[test]
    fn classified_paths_match_their_depth(
        ordinals in proptest::collection::vec(1u32..100, 1..=4),
    ) {
        let path: String = ordinals
            .iter()
            .zip(NodeKind::ALL)
            .map(|(n, kind)| format!("/{}{n}", kind.prefix()))
            .collect();
        let kind = classify(&path).unwrap();
        prop_assert_eq!(kind.depth(), depth(&path));
    }
}
