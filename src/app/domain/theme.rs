//! Typed document styling.
//!
//! A [`Theme`] is a partial mapping from [`ThemeKey`] to [`ThemeValue`]. Keys
//! missing from a document theme resolve through [`default_theme`], which is
//! complete. Every key carries exactly one [`PropertyType`] and only accepts
//! values of that type.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use serde_json::{Map, Value, json};

use crate::app::infrastructure::error::ThemeError;

/// Font name that defers to the default theme's base font family.
pub const INHERIT_FONT: &str = "inherit";

const FONT_NAME_FIELD: &str = "fontName";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    Font,
    String,
    Number,
    Length,
    Color,
    Dimensions,
}

impl PropertyType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Font => "font",
            Self::String => "string",
            Self::Number => "number",
            Self::Length => "length",
            Self::Color => "color",
            Self::Dimensions => "dimensions",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ThemeKey {
    BaseFontFamily,
    BaseFontSize,
    BaseColor,
    BackgroundColor,
    LineHeight,
    PageWidth,
    PagePadding,
    ParagraphSpacing,
    HeadingFontFamily,
    HeadingColor,
    H1Size,
    H2Size,
    H3Size,
    H4Size,
    H5Size,
    H6Size,
    LinkColor,
    Language,
}

impl ThemeKey {
    /// Spelling used in `.vox` files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BaseFontFamily => "baseFontFamily",
            Self::BaseFontSize => "baseFontSize",
            Self::BaseColor => "baseColor",
            Self::BackgroundColor => "backgroundColor",
            Self::LineHeight => "lineHeight",
            Self::PageWidth => "pageWidth",
            Self::PagePadding => "pagePadding",
            Self::ParagraphSpacing => "paragraphSpacing",
            Self::HeadingFontFamily => "headingFontFamily",
            Self::HeadingColor => "headingColor",
            Self::H1Size => "h1Size",
            Self::H2Size => "h2Size",
            Self::H3Size => "h3Size",
            Self::H4Size => "h4Size",
            Self::H5Size => "h5Size",
            Self::H6Size => "h6Size",
            Self::LinkColor => "linkColor",
            Self::Language => "language",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|key| key.name() == name)
    }

    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::BaseFontFamily | Self::HeadingFontFamily => PropertyType::Font,
            Self::BaseFontSize
            | Self::PageWidth
            | Self::ParagraphSpacing
            | Self::H1Size
            | Self::H2Size
            | Self::H3Size
            | Self::H4Size
            | Self::H5Size
            | Self::H6Size => PropertyType::Length,
            Self::BaseColor | Self::BackgroundColor | Self::HeadingColor | Self::LinkColor => {
                PropertyType::Color
            }
            Self::LineHeight => PropertyType::Number,
            Self::PagePadding => PropertyType::Dimensions,
            Self::Language => PropertyType::String,
        }
    }

    /// Size key for a heading level, `None` outside 1..=6.
    pub fn heading_size(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::H1Size),
            2 => Some(Self::H2Size),
            3 => Some(Self::H3Size),
            4 => Some(Self::H4Size),
            5 => Some(Self::H5Size),
            6 => Some(Self::H6Size),
            _ => None,
        }
    }

    pub fn all() -> &'static [ThemeKey] {
        &[
            Self::BaseFontFamily,
            Self::BaseFontSize,
            Self::BaseColor,
            Self::BackgroundColor,
            Self::LineHeight,
            Self::PageWidth,
            Self::PagePadding,
            Self::ParagraphSpacing,
            Self::HeadingFontFamily,
            Self::HeadingColor,
            Self::H1Size,
            Self::H2Size,
            Self::H3Size,
            Self::H4Size,
            Self::H5Size,
            Self::H6Size,
            Self::LinkColor,
            Self::Language,
        ]
    }
}

impl fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Px,
    Pt,
    Em,
    Cm,
    Mm,
    In,
    Pc,
}

impl LengthUnit {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Pt => "pt",
            Self::Em => "em",
            Self::Cm => "cm",
            Self::Mm => "mm",
            Self::In => "in",
            Self::Pc => "pc",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|unit| unit.name() == name)
    }

    /// Pixels per unit, `None` for the relative unit.
    pub fn px_ratio(&self) -> Option<f64> {
        match self {
            Self::Px => Some(1.0),
            Self::Pt => Some(1.33),
            Self::Pc => Some(16.0),
            Self::In => Some(96.0),
            Self::Mm => Some(3.78),
            Self::Cm => Some(37.8),
            Self::Em => None,
        }
    }

    pub fn is_relative(&self) -> bool {
        self.px_ratio().is_none()
    }

    pub fn all() -> &'static [LengthUnit] {
        &[Self::Px, Self::Pt, Self::Em, Self::Cm, Self::Mm, Self::In, Self::Pc]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub unit: LengthUnit,
    pub value: f64,
}

impl Length {
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Self { unit, value }
    }

    pub fn px(value: f64) -> Self {
        Self::new(value, LengthUnit::Px)
    }

    fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.len() != 1 {
            return None;
        }
        let (unit, amount) = object.iter().next()?;
        Some(Self::new(amount.as_f64()?, LengthUnit::from_name(unit)?))
    }

    fn to_json(self) -> Value {
        let mut object = Map::new();
        object.insert(self.unit.name().to_string(), json!(self.value));
        Value::Object(object)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions(pub [Length; 4]);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Font {
    pub font_name: String,
}

impl Font {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            font_name: name.into(),
        }
    }

    pub fn is_inherit(&self) -> bool {
        self.font_name == INHERIT_FONT
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThemeValue {
    Font(Font),
    String(String),
    Number(f64),
    Length(Length),
    Color(Color),
    Dimensions(Dimensions),
}

impl ThemeValue {
    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::Font(_) => PropertyType::Font,
            Self::String(_) => PropertyType::String,
            Self::Number(_) => PropertyType::Number,
            Self::Length(_) => PropertyType::Length,
            Self::Color(_) => PropertyType::Color,
            Self::Dimensions(_) => PropertyType::Dimensions,
        }
    }

    /// Infers a typed value from its JSON shape.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) if items.len() == 3 => {
                let mut channels = [0u8; 3];
                for (channel, item) in channels.iter_mut().zip(items) {
                    *channel = u8::try_from(item.as_u64()?).ok()?;
                }
                Some(Self::Color(Color::rgb(channels[0], channels[1], channels[2])))
            }
            Value::Array(items) if items.len() == 4 => {
                let mut sides = [Length::px(0.0); 4];
                for (side, item) in sides.iter_mut().zip(items) {
                    *side = Length::from_json(item)?;
                }
                Some(Self::Dimensions(Dimensions(sides)))
            }
            Value::Object(object) if object.len() == 1 => match object.get(FONT_NAME_FIELD) {
                Some(name) => Some(Self::Font(Font::new(name.as_str()?))),
                None => Length::from_json(value).map(Self::Length),
            },
            Value::String(text) => Some(Self::String(text.clone())),
            Value::Number(number) => number.as_f64().map(Self::Number),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Font(font) => {
                let mut object = Map::new();
                object.insert(FONT_NAME_FIELD.to_string(), Value::String(font.font_name.clone()));
                Value::Object(object)
            }
            Self::String(text) => Value::String(text.clone()),
            Self::Number(number) => json!(number),
            Self::Length(length) => length.to_json(),
            Self::Color(color) => json!([color.r, color.g, color.b]),
            Self::Dimensions(Dimensions(sides)) => {
                Value::Array(sides.iter().map(|side| side.to_json()).collect())
            }
        }
    }
}

/// Type of a raw JSON value as a theme property, `None` when it fits no type.
pub fn property_type(value: &Value) -> Option<PropertyType> {
    ThemeValue::from_json(value).map(|typed| typed.property_type())
}

/// The fonts every document can use without embedding them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFont {
    Serif,
    SansSerif,
    Monospace,
}

impl BuiltinFont {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Serif => "serif",
            Self::SansSerif => "sans-serif",
            Self::Monospace => "monospace",
        }
    }

    pub fn css_stack(&self) -> &'static str {
        match self {
            Self::Serif => "Georgia, 'Times New Roman', serif",
            Self::SansSerif => "'Helvetica Neue', Arial, sans-serif",
            Self::Monospace => "'Courier New', Courier, monospace",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|font| font.name() == name)
    }

    pub fn is_reserved(name: &str) -> bool {
        Self::from_name(name).is_some()
    }

    pub fn all() -> &'static [BuiltinFont] {
        &[Self::Serif, Self::SansSerif, Self::Monospace]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Theme {
    values: BTreeMap<ThemeKey, ThemeValue>,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: ThemeKey) -> Option<&ThemeValue> {
        self.values.get(&key)
    }

    /// Document value for `key`, or the default theme's.
    pub fn resolve(&self, key: ThemeKey) -> &ThemeValue {
        match self.values.get(&key) {
            Some(value) => value,
            None => default_theme().values.get(&key).unwrap_or(&FALLBACK_VALUE),
        }
    }

    pub fn set(&mut self, key: ThemeKey, value: ThemeValue) -> Result<(), ThemeError> {
        let expected = key.property_type();
        if value.property_type() != expected {
            return Err(ThemeError::TypeMismatch {
                key: key.name().to_string(),
                expected: expected.name().to_string(),
                found: value.property_type().name().to_string(),
            });
        }
        self.values.insert(key, value);
        Ok(())
    }

    pub fn remove(&mut self, key: ThemeKey) -> Option<ThemeValue> {
        self.values.remove(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ThemeKey, &ThemeValue)> {
        self.values.iter().map(|(key, value)| (*key, value))
    }

    /// Points every font-valued key naming `old` at `new`. Returns how many changed.
    pub fn rename_font(&mut self, old: &str, new: &str) -> usize {
        let mut changed = 0;
        for value in self.values.values_mut() {
            if let ThemeValue::Font(font) = value {
                if font.font_name == old {
                    font.font_name = new.to_string();
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Drops every key whose font is `font_name`, returning the keys dropped.
    pub fn clear_font(&mut self, font_name: &str) -> Vec<ThemeKey> {
        let keys: Vec<ThemeKey> = self
            .values
            .iter()
            .filter(|(_, value)| matches!(value, ThemeValue::Font(font) if font.font_name == font_name))
            .map(|(key, _)| *key)
            .collect();
        for key in &keys {
            self.values.remove(key);
        }
        keys
    }
}

// Only reachable if the default table were incomplete; validate_defaults rules that out.
static FALLBACK_VALUE: ThemeValue = ThemeValue::Number(0.0);

static DEFAULT_THEME: LazyLock<Theme> = LazyLock::new(build_default_theme);

/// The complete theme every document falls back to.
pub fn default_theme() -> &'static Theme {
    &DEFAULT_THEME
}

fn build_default_theme() -> Theme {
    use LengthUnit::{Cm, Em, In, Px};

    let inch = Length::new(1.0, In);
    let entries = [
        (ThemeKey::BaseFontFamily, ThemeValue::Font(Font::new(BuiltinFont::Serif.name()))),
        (ThemeKey::BaseFontSize, ThemeValue::Length(Length::new(16.0, Px))),
        (ThemeKey::BaseColor, ThemeValue::Color(Color::rgb(34, 34, 34))),
        (ThemeKey::BackgroundColor, ThemeValue::Color(Color::rgb(255, 255, 255))),
        (ThemeKey::LineHeight, ThemeValue::Number(1.5)),
        (ThemeKey::PageWidth, ThemeValue::Length(Length::new(21.0, Cm))),
        (ThemeKey::PagePadding, ThemeValue::Dimensions(Dimensions([inch; 4]))),
        (ThemeKey::ParagraphSpacing, ThemeValue::Length(Length::new(0.5, Em))),
        (ThemeKey::HeadingFontFamily, ThemeValue::Font(Font::new(INHERIT_FONT))),
        (ThemeKey::HeadingColor, ThemeValue::Color(Color::rgb(17, 17, 17))),
        (ThemeKey::H1Size, ThemeValue::Length(Length::new(2.0, Em))),
        (ThemeKey::H2Size, ThemeValue::Length(Length::new(1.5, Em))),
        (ThemeKey::H3Size, ThemeValue::Length(Length::new(1.17, Em))),
        (ThemeKey::H4Size, ThemeValue::Length(Length::new(1.0, Em))),
        (ThemeKey::H5Size, ThemeValue::Length(Length::new(0.83, Em))),
        (ThemeKey::H6Size, ThemeValue::Length(Length::new(0.67, Em))),
        (ThemeKey::LinkColor, ThemeValue::Color(Color::rgb(0, 102, 204))),
        (ThemeKey::Language, ThemeValue::String("en".to_string())),
    ];
    Theme {
        values: entries.into_iter().collect(),
    }
}

/// Checks the invariants the resolution functions rely on. Run once at startup.
pub fn validate_defaults() -> Result<(), ThemeError> {
    let defaults = default_theme();
    for &key in ThemeKey::all() {
        let value = defaults.values.get(&key).ok_or_else(|| ThemeError::TypeMismatch {
            key: key.name().to_string(),
            expected: key.property_type().name().to_string(),
            found: "nothing".to_string(),
        })?;
        if value.property_type() != key.property_type() {
            return Err(ThemeError::TypeMismatch {
                key: key.name().to_string(),
                expected: key.property_type().name().to_string(),
                found: value.property_type().name().to_string(),
            });
        }
        if let ThemeValue::Font(font) = value {
            if !font.is_inherit() && !BuiltinFont::is_reserved(&font.font_name) {
                return Err(ThemeError::UnknownDefaultFont {
                    key: key.name().to_string(),
                    font: font.font_name.clone(),
                });
            }
        }
    }
    match defaults.values.get(&ThemeKey::BaseFontSize) {
        Some(ThemeValue::Length(length)) if !length.unit.is_relative() => Ok(()),
        _ => Err(ThemeError::RelativeBaseFontSize),
    }
}

const FALLBACK_BASE_PX: f64 = 16.0;

fn default_base_font_px() -> f64 {
    match default_theme().values.get(&ThemeKey::BaseFontSize) {
        Some(ThemeValue::Length(length)) => length
            .unit
            .px_ratio()
            .map_or(FALLBACK_BASE_PX, |ratio| length.value * ratio),
        _ => FALLBACK_BASE_PX,
    }
}

fn base_font_px(theme: &Theme) -> f64 {
    match theme.get(ThemeKey::BaseFontSize) {
        Some(ThemeValue::Length(length)) => match length.unit.px_ratio() {
            Some(ratio) => length.value * ratio,
            None => length.value * default_base_font_px(),
        },
        _ => default_base_font_px(),
    }
}

pub fn length_to_px(theme: &Theme, length: Length) -> f64 {
    match length.unit.px_ratio() {
        Some(ratio) => length.value * ratio,
        None => length.value * base_font_px(theme),
    }
}

pub fn length_convert(theme: &Theme, value: f64, from: LengthUnit, to: LengthUnit) -> f64 {
    let from_px = length_to_px(theme, Length::new(1.0, from));
    let to_px = length_to_px(theme, Length::new(1.0, to));
    value * from_px / to_px
}

fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{}", rounded)
}

fn length_string(theme: &Theme, length: Length) -> String {
    if length.unit.is_relative() {
        format!("{}px", format_number(length_to_px(theme, length)))
    } else {
        format!("{}{}", format_number(length.value), length.unit.name())
    }
}

/// CSS `font-family` value for a font name. Built-ins expand to a stack,
/// `inherit` follows the default base font, anything else is a custom family.
pub fn font_family_css(font_name: &str) -> String {
    if font_name == INHERIT_FONT {
        return match default_theme().values.get(&ThemeKey::BaseFontFamily) {
            Some(ThemeValue::Font(base)) if !base.is_inherit() => font_family_css(&base.font_name),
            _ => BuiltinFont::Serif.css_stack().to_string(),
        };
    }
    match BuiltinFont::from_name(font_name) {
        Some(builtin) => builtin.css_stack().to_string(),
        None => format!("'{}'", font_name.replace('\'', "\\'")),
    }
}

/// Styling-directive form of a typed value.
pub fn property_string(theme: &Theme, value: &ThemeValue) -> String {
    match value {
        ThemeValue::Font(font) => font_family_css(&font.font_name),
        ThemeValue::String(text) => text.clone(),
        ThemeValue::Number(number) => format_number(*number),
        ThemeValue::Length(length) => length_string(theme, *length),
        ThemeValue::Color(color) => format!("{}, {}, {}", color.r, color.g, color.b),
        ThemeValue::Dimensions(Dimensions(sides)) => sides
            .iter()
            .map(|side| length_string(theme, *side))
            .collect::<Vec<_>>()
            .join(" "),
    }
}
