//! Mapping between a [`Configuration`] and its route representation
//!
//! A route is a flat set of `key=value` pairs that lives in the URL fragment.
//! Encoding elides every field equal to its default, so the default
//! configuration encodes to an empty route. Decoding starts from the defaults,
//! ignores keys it does not know, and falls back to the default for any value
//! that fails to parse or lies outside the allowed range.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use log::debug;
use url::form_urlencoded;

use crate::model::{Configuration, Defaults, Kerning};

/// Flat, ordered route representation
pub type RouteMap = BTreeMap<String, String>;

/// Route keys, as they appear in shared links
pub mod keys {
    pub const TEXT: &str = "text";
    pub const FONT_SIZE: &str = "fontSize";
    pub const KERNING: &str = "kerning";
    pub const ALT_BG: &str = "altBg";
    pub const ALT_BG_OPACITY: &str = "altBgOpacity";
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const K: &str = "k";

    pub const ALL: [&str; 8] = [TEXT, FONT_SIZE, KERNING, ALT_BG, ALT_BG_OPACITY, X, Y, K];
}

/// Type coercion rules applied on top of the plain string route
///
/// Boolean keys listed here round-trip as `true`/`false` text. Unlisted
/// boolean keys use presence semantics: the key present means `true`,
/// whatever its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecRules {
    coerce_to_bool: BTreeSet<String>,
}

impl Default for CodecRules {
    fn default() -> Self {
        CodecRules::none().with_bool_coercion(keys::ALT_BG)
    }
}

impl CodecRules {
    /// Rules with no coercion list: every flag uses presence semantics
    pub fn none() -> Self {
        Self {
            coerce_to_bool: BTreeSet::new(),
        }
    }

    pub fn with_bool_coercion(mut self, key: &str) -> Self {
        self.coerce_to_bool.insert(key.to_string());
        self
    }

    pub fn coerces_to_bool(&self, key: &str) -> bool {
        self.coerce_to_bool.contains(key)
    }
}

/// Encoder/decoder bound to one defaults record and one rule set
#[derive(Debug, Clone)]
pub struct ConfigCodec {
    defaults: Arc<Defaults>,
    rules: CodecRules,
}

impl ConfigCodec {
    pub fn new(defaults: Arc<Defaults>) -> Self {
        Self::with_rules(defaults, CodecRules::default())
    }

    pub fn with_rules(defaults: Arc<Defaults>, rules: CodecRules) -> Self {
        Self { defaults, rules }
    }

    pub fn defaults(&self) -> &Arc<Defaults> {
        &self.defaults
    }

    pub fn encode(&self, config: &Configuration) -> RouteMap {
        encode_with(config, &self.defaults, &self.rules)
    }

    pub fn decode(&self, route: &RouteMap) -> Configuration {
        decode_with(route, &self.defaults, &self.rules)
    }

    /// Encode straight to fragment text (without the leading `#`)
    pub fn encode_fragment(&self, config: &Configuration) -> String {
        format_fragment(&self.encode(config))
    }

    pub fn decode_fragment(&self, fragment: &str) -> Configuration {
        self.decode(&parse_fragment(fragment))
    }
}

/// Encode with the default rule set
pub fn encode(config: &Configuration, defaults: &Defaults) -> RouteMap {
    encode_with(config, defaults, &CodecRules::default())
}

/// Decode with the default rule set
pub fn decode(route: &RouteMap, defaults: &Defaults) -> Configuration {
    decode_with(route, defaults, &CodecRules::default())
}

pub fn encode_with(config: &Configuration, defaults: &Defaults, rules: &CodecRules) -> RouteMap {
    let d = &defaults.values;
    let mut route = RouteMap::new();

    if config.text != d.text {
        route.insert(keys::TEXT.into(), config.text.clone());
    }
    if config.font_size != d.font_size {
        route.insert(keys::FONT_SIZE.into(), config.font_size.to_string());
    }
    if config.kerning != d.kerning {
        route.insert(keys::KERNING.into(), config.kerning.raw().to_string());
    }
    if config.alt_background != d.alt_background {
        if let Some(value) = encode_flag(rules, keys::ALT_BG, config.alt_background) {
            route.insert(keys::ALT_BG.into(), value);
        }
    }
    if config.alt_background_opacity != d.alt_background_opacity {
        route.insert(
            keys::ALT_BG_OPACITY.into(),
            config.alt_background_opacity.to_string(),
        );
    }
    for (key, value, default) in [
        (keys::X, config.view.x, d.view.x),
        (keys::Y, config.view.y, d.view.y),
        (keys::K, config.view.k, d.view.k),
    ] {
        if value != default {
            route.insert(key.into(), value.to_string());
        }
    }

    route
}

pub fn decode_with(route: &RouteMap, defaults: &Defaults, rules: &CodecRules) -> Configuration {
    let d = &defaults.values;

    let unknown = route.keys().filter(|k| !keys::ALL.contains(&k.as_str())).count();
    if unknown > 0 {
        debug!("ignoring {} unrecognized route key(s)", unknown);
    }

    let text = route.get(keys::TEXT).cloned().unwrap_or_else(|| d.text.clone());
    let font_size = coerce(route, keys::FONT_SIZE, d.font_size, |raw| {
        parse_integer(raw).filter(|v| defaults.font_size_in_range(*v))
    });
    let kerning = coerce(route, keys::KERNING, d.kerning.clone(), |raw| {
        Some(Kerning::new(raw)).filter(|k| defaults.kerning_in_range(k))
    });
    let alt_background = coerce(route, keys::ALT_BG, d.alt_background, |raw| {
        decode_flag(rules, keys::ALT_BG, raw)
    });
    let alt_background_opacity = coerce(route, keys::ALT_BG_OPACITY, d.alt_background_opacity, |raw| {
        parse_integer(raw)
            .filter(|v| *v <= 100)
            .map(|v| v as u8)
    });

    let mut view = d.view;
    view.x = coerce(route, keys::X, d.view.x, parse_decimal);
    view.y = coerce(route, keys::Y, d.view.y, parse_decimal);
    view.k = coerce(route, keys::K, d.view.k, |raw| {
        parse_decimal(raw).filter(|k| defaults.scale_in_range(*k))
    });

    Configuration {
        text,
        font_size,
        kerning,
        alt_background,
        alt_background_opacity,
        view,
    }
}

/// Parse fragment text (with or without the leading `#`) into a route
///
/// Repeated keys keep their last value.
pub fn parse_fragment(fragment: &str) -> RouteMap {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    form_urlencoded::parse(fragment.as_bytes())
        .into_owned()
        .collect()
}

/// Serialize a route to fragment-safe text, without the leading `#`
pub fn format_fragment(route: &RouteMap) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(route.iter())
        .finish()
}

fn coerce<T>(route: &RouteMap, key: &str, default: T, parse: impl FnOnce(&str) -> Option<T>) -> T {
    match route.get(key) {
        None => default,
        Some(raw) => match parse(raw) {
            Some(value) => value,
            None => {
                debug!("route value {}={:?} rejected, using default", key, raw);
                default
            }
        },
    }
}

fn encode_flag(rules: &CodecRules, key: &str, value: bool) -> Option<String> {
    if rules.coerces_to_bool(key) {
        Some(value.to_string())
    } else if value {
        Some(String::new())
    } else {
        // absence already means false for presence-style flags
        None
    }
}

fn decode_flag(rules: &CodecRules, key: &str, raw: &str) -> Option<bool> {
    if !rules.coerces_to_bool(key) {
        return Some(true);
    }
    // Non-empty text is not truthy here: "false" must stay false.
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_integer(raw: &str) -> Option<u32> {
    parse_decimal(raw)
        .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64)
        .map(|v| v as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ViewTransform;

    fn route(pairs: &[(&str, &str)]) -> RouteMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_encode_to_empty_route() {
        let d = Defaults::default();
        assert!(encode(&d.values, &d).is_empty());
        assert_eq!(format_fragment(&encode(&d.values, &d)), "");
        assert_eq!(decode(&RouteMap::new(), &d), d.values);
    }

    #[test]
    fn explicit_default_decodes_like_omission() {
        let d = Defaults::default();
        let explicit = route(&[("fontSize", "22"), ("kerning", "0.000"), ("altBg", "false"), ("k", "1")]);
        assert_eq!(decode(&explicit, &d), d.values);
    }

    #[test]
    fn round_trips_reachable_configurations() {
        let d = Defaults::default();
        let samples = vec![
            Configuration {
                text: "Hello, World!\nsecond line & more".into(),
                font_size: 30,
                kerning: Kerning::new("0.125"),
                alt_background: true,
                alt_background_opacity: 75,
                view: ViewTransform::new(-12.5, 3.25, 4.0),
            },
            Configuration {
                text: String::new(),
                kerning: Kerning::new("0"),
                ..d.values.clone()
            },
            Configuration {
                alt_background_opacity: 0,
                view: ViewTransform::new(0.0, 0.0, 32.0),
                ..d.values.clone()
            },
        ];
        for config in samples {
            assert_eq!(decode(&encode(&config, &d), &d), config);

            let codec = ConfigCodec::new(Arc::new(d.clone()));
            let fragment = codec.encode_fragment(&config);
            assert_eq!(codec.decode_fragment(&format!("#{}", fragment)), config);
        }
    }

    #[test]
    fn false_text_is_not_truthy() {
        let d = Defaults::default();
        let decoded = decode(&route(&[("altBg", "false")]), &d);
        assert!(!decoded.alt_background);
        let decoded = decode(&route(&[("altBg", "true")]), &d);
        assert!(decoded.alt_background);
    }

    #[test]
    fn presence_semantics_without_coercion() {
        let d = Defaults::default();
        let rules = CodecRules::none();
        let on = Configuration {
            alt_background: true,
            ..d.values.clone()
        };
        let encoded = encode_with(&on, &d, &rules);
        assert_eq!(encoded.get("altBg").map(String::as_str), Some(""));
        assert!(decode_with(&encoded, &d, &rules).alt_background);
        assert!(!decode_with(&RouteMap::new(), &d, &rules).alt_background);
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let d = Defaults::default();
        let decoded = decode(
            &route(&[
                ("fontSize", "huge"),
                ("kerning", "9"),
                ("altBg", "maybe"),
                ("altBgOpacity", "250"),
                ("x", "NaN"),
                ("k", "64"),
                ("y", "12"),
            ]),
            &d,
        );
        assert_eq!(decoded.font_size, d.values.font_size);
        assert_eq!(decoded.kerning, d.values.kerning);
        assert_eq!(decoded.alt_background, d.values.alt_background);
        assert_eq!(decoded.alt_background_opacity, d.values.alt_background_opacity);
        assert_eq!(decoded.view, ViewTransform::new(d.values.view.x, 12.0, d.values.view.k));
    }

    #[test]
    fn reencoding_is_minimal_and_drops_unknown_keys() {
        let d = Defaults::default();
        let input = route(&[("fontSize", "22"), ("x", "5"), ("panel", "open"), ("utm", "x")]);
        let minimal = encode(&decode(&input, &d), &d);
        assert_eq!(minimal, route(&[("x", "5")]));
    }

    #[test]
    fn fragment_parsing_handles_prefix_and_escapes() {
        let parsed = parse_fragment("#text=Hi%2C+there%0Aok&fontSize=30&fontSize=31");
        assert_eq!(parsed.get("text").map(String::as_str), Some("Hi, there\nok"));
        assert_eq!(parsed.get("fontSize").map(String::as_str), Some("31"));
        assert!(parse_fragment("").is_empty());
    }
}
