//! End-to-end behaviour of documents through the public API.

use serde_json::{Map, Value, json};

use voxdoc::app::domain::delta::{AttributeMap, Delta, Operation};
use voxdoc::app::domain::document::{Document, History, SelectionRange, StackItem};
use voxdoc::app::domain::settings::{OutputFormat, PostProcess};
use voxdoc::app::domain::theme::{
    BuiltinFont, Color, Dimensions, Font, Length, LengthUnit, ThemeKey, ThemeValue, default_theme,
    length_convert, length_to_px,
};
use voxdoc::app::infrastructure::error::{AssetError, FetchError, ParseErrorKind};
use voxdoc::app::infrastructure::fetch::{AssetFetcher, FetchedAsset};
use voxdoc::app::services::assets;
use voxdoc::app::services::codec::{parse, write};
use voxdoc::app::services::render::{Renderer, build_sections, render};

const TTF: &str = "data:font/ttf;base64,AAEAAA==";
const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

struct StaticFetcher;

impl AssetFetcher for StaticFetcher {
    fn fetch(&self, _source: &str) -> Result<FetchedAsset, FetchError> {
        Ok(FetchedAsset {
            bytes: b"same bytes".to_vec(),
            mime: "image/png".to_string(),
        })
    }
}

fn attrs(value: Value) -> AttributeMap {
    match value {
        Value::Object(map) => map,
        _ => panic!("attributes must be an object"),
    }
}

fn sample_document() -> Document {
    let mut doc = Document::new();
    let cat = assets::register_image(&mut doc, "https://img.test/cat.png", &StaticFetcher).unwrap();
    let inline = assets::register_image(&mut doc, PNG, &StaticFetcher).unwrap();
    assets::register_font_data(&mut doc, "Lato Light", TTF).unwrap();

    doc.set_theme(ThemeKey::BaseFontFamily, ThemeValue::Font(Font::new("Lato Light")))
        .unwrap();
    doc.set_theme(ThemeKey::BaseColor, ThemeValue::Color(Color::rgb(10, 20, 30)))
        .unwrap();
    doc.set_theme(ThemeKey::LineHeight, ThemeValue::Number(1.25)).unwrap();
    doc.set_theme(
        ThemeKey::PagePadding,
        ThemeValue::Dimensions(Dimensions([
            Length::new(2.0, LengthUnit::Cm),
            Length::new(1.5, LengthUnit::Cm),
            Length::new(2.0, LengthUnit::Cm),
            Length::new(1.5, LengthUnit::Cm),
        ])),
    )
    .unwrap();
    doc.set_theme(ThemeKey::Language, ThemeValue::String("de".into()))
        .unwrap();

    doc.append([
        Operation::insert_with("Title", attrs(json!({"italic": true, "color": "#aa0000"}))),
        Operation::insert_with("\n", attrs(json!({"header": 2, "align": "center"}))),
        Operation::insert("Tabs\tand \"quotes\" survive\n"),
        Operation::embed("image", json!(cat)),
        Operation::embed("image", json!(inline)),
        Operation::insert("\n"),
    ])
    .unwrap();

    doc.apply_change(
        Delta::from_ops(vec![Operation::retain(5), Operation::insert("!")]),
        SelectionRange::new(5, 0),
    )
    .unwrap();
    doc.history.redo.push(StackItem {
        range: SelectionRange::new(0, 3),
        delta: Delta::from_ops(vec![Operation::delete(3)]),
    });
    doc
}

#[test]
fn test_round_trip_preserves_every_field() {
    let doc = sample_document();
    let text = write(&doc);
    let parsed = parse(&text).unwrap();
    assert_eq!(parsed, doc);
    assert_eq!(write(&parsed), text);
}

#[test]
fn test_round_trip_of_blank_document() {
    let doc = Document::new();
    let parsed = parse(&write(&doc)).unwrap();
    assert!(parsed.is_blank());
    assert_eq!(parsed, doc);
}

#[test]
fn test_round_trip_preserves_attribute_order() {
    let mut doc = Document::new();
    doc.append([Operation::insert_with(
        "x",
        attrs(json!({"underline": true, "bold": true, "link": "https://a.test"})),
    )])
    .unwrap();
    let parsed = parse(&write(&doc)).unwrap();
    let names: Vec<&String> = match &parsed.operations.ops()[0] {
        Operation::Insert { attributes, .. } => attributes.keys().collect(),
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(names, ["underline", "bold", "link"]);
}

#[test]
fn test_round_trip_of_computed_lengths() {
    let theme = default_theme();
    for i in 1..2000 {
        let value = length_convert(theme, i as f64 * 0.37, LengthUnit::Pt, LengthUnit::Cm);
        let mut doc = Document::new();
        doc.set_theme(ThemeKey::PageWidth, ThemeValue::Length(Length::new(value, LengthUnit::Cm)))
            .unwrap();
        doc.set_theme(ThemeKey::LineHeight, ThemeValue::Number(value / 3.0)).unwrap();
        let parsed = parse(&write(&doc)).unwrap();
        assert_eq!(parsed, doc, "value {}", value);
    }
}

#[test]
fn test_inline_images_dedup_by_content() {
    let mut doc = Document::new();
    let first = assets::register_image(&mut doc, PNG, &StaticFetcher).unwrap();
    let second = assets::register_image(&mut doc, PNG, &StaticFetcher).unwrap();
    assert_eq!(first, second);
    assert_eq!(doc.images.len(), 1);
}

#[test]
fn test_external_images_dedup_by_source() {
    let mut doc = Document::new();
    let a = assets::register_image(&mut doc, "https://a.test/1.png", &StaticFetcher).unwrap();
    let b = assets::register_image(&mut doc, "https://b.test/1.png", &StaticFetcher).unwrap();
    assert_ne!(a, b);
    assert_eq!(doc.images.len(), 2);
    assert_eq!(
        assets::register_image(&mut doc, "https://a.test/1.png", &StaticFetcher).unwrap(),
        a
    );
}

#[test]
fn test_font_validity() {
    let mut doc = Document::new();
    assert!(matches!(
        assets::register_font_data(&mut doc, "Lato", "data:font/woff2;base64,AAAA"),
        Err(AssetError::InvalidFontData(_))
    ));
    assets::register_font_data(&mut doc, "Lato", TTF).unwrap();
    assert_eq!(doc.fonts.get("Lato").map(String::as_str), Some(TTF));

    for builtin in BuiltinFont::all() {
        assert!(assets::rename_font(&mut doc, builtin.name(), "Renamed").is_err());
        assert!(assets::delete_font(&mut doc, builtin.name()).is_err());
    }
}

#[test]
fn test_absolute_length_conversion_round_trips() {
    let theme = default_theme();
    let absolute = [
        LengthUnit::Px,
        LengthUnit::Pt,
        LengthUnit::In,
        LengthUnit::Cm,
        LengthUnit::Mm,
        LengthUnit::Pc,
    ];
    for &from in &absolute {
        for &to in &absolute {
            let value = 12.5;
            let converted = length_convert(theme, value, from, to);
            let back = length_convert(theme, converted, to, from);
            assert!((back - value).abs() < 1e-9, "{:?} -> {:?}", from, to);

            let px_before = length_to_px(theme, Length::new(value, from));
            let px_after = length_to_px(theme, Length::new(converted, to));
            assert!((px_before - px_after).abs() < 1e-9);
        }
    }
}

#[test]
fn test_blank_detection() {
    assert!(Document::new().is_blank());

    let mut doc = Document::new();
    doc.append([Operation::insert("a")]).unwrap();
    assert!(!doc.is_blank());

    let mut doc = Document::new();
    doc.set_theme(ThemeKey::H1Size, ThemeValue::Length(Length::px(30.0)))
        .unwrap();
    assert!(!doc.is_blank());

    let mut doc = Document::new();
    assets::register_image(&mut doc, PNG, &StaticFetcher).unwrap();
    assert!(!doc.is_blank());

    let mut doc = Document::new();
    assets::register_font_data(&mut doc, "Lato", TTF).unwrap();
    assert!(!doc.is_blank());

    let mut doc = Document::new();
    doc.apply_snapshot(Delta::new(), History::default()).unwrap();
    assert!(doc.is_blank());
}

#[test]
fn test_render_sections_and_determinism() {
    let mut doc = Document::new();
    doc.append([
        Operation::insert_with("Hello", attrs(json!({"bold": true}))),
        Operation::insert_with("\n", attrs(json!({"header": 1}))),
        Operation::insert("World"),
        Operation::insert("\n"),
    ])
    .unwrap();

    let sections = build_sections(doc.operations.ops()).unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].attributes.get("header"), Some(&json!(1)));
    assert_eq!(sections[0].content[0].attributes.get("bold"), Some(&json!(true)));
    assert!(sections[1].attributes.get("header").is_none());

    let renderer = Renderer::default();
    let first = renderer.render(&doc).unwrap();
    assert_eq!(renderer.render(&doc).unwrap(), first);
    assert!(first.contains("<h1><strong>Hello</strong></h1>"));
    assert!(first.contains("<p>World</p>"));

    for format in [OutputFormat::Html, OutputFormat::Markdown] {
        for post in [PostProcess::None, PostProcess::Minify, PostProcess::Pretty] {
            assert_eq!(render(&doc, format, post).unwrap(), render(&doc, format, post).unwrap());
        }
    }
}

#[test]
fn test_render_full_sample() {
    let doc = sample_document();
    let html = Renderer::default().render(&doc).unwrap();
    assert!(html.contains("<html lang=\"de\">"));
    assert!(html.contains("@font-face { font-family: 'Lato Light';"));
    assert!(html.contains("color: rgb(10, 20, 30)"));
    assert!(html.contains("padding: 2cm 1.5cm 2cm 1.5cm"));
    assert!(html.contains("<h2 style=\"text-align: center\">"));
    assert!(html.contains("<img src=\"data:image/png;base64,"));
}

#[test]
fn test_parse_errors_surface() {
    let err = parse("theme\ndelta\ntheme\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::DuplicateBlock("theme".into()));
    assert_eq!(err.line, 3);
    assert!(err.to_string().contains("duplicate theme block"));

    let err = parse("delta\n\tI \"x\"\n\t\tbold true\n\t\tbold false\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::DuplicateAttribute("bold".into()));
    assert!(err.to_string().contains("duplicate attribute"));
}

#[test]
fn test_attribute_map_type_is_ordered() {
    let mut map: Map<String, Value> = Map::new();
    map.insert("z".into(), json!(1));
    map.insert("a".into(), json!(2));
    assert_eq!(map.keys().collect::<Vec<_>>(), ["z", "a"]);
}
