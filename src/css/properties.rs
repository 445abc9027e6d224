//! Property parsing: declaration values → typed [`Styles`] fields.

use crate::css::length::{Length, Sides};
use crate::css::model::DeclarationValue;
use crate::css::styles::Styles;

/// Names accepted by [`apply_declaration`].
pub const KNOWN_PROPERTIES: [&str; 11] = [
    "color",
    "background-color",
    "opacity",
    "font-size",
    "margin",
    "padding",
    "min-width",
    "min-height",
    "transition-duration",
    "transition-property",
    "transition",
];

/// Errors from property parsing.
#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    #[error("unknown property: {0}")]
    UnknownProperty(String),
    #[error("invalid value for {property}: {message}")]
    InvalidValue { property: String, message: String },
}

fn invalid(property: &str, message: impl Into<String>) -> PropertyError {
    PropertyError::InvalidValue {
        property: property.into(),
        message: message.into(),
    }
}

fn require_single<'a>(
    values: &'a [DeclarationValue],
    property: &str,
) -> Result<&'a DeclarationValue, PropertyError> {
    match values {
        [value] => Ok(value),
        _ => Err(invalid(property, format!("expected 1 value, got {}", values.len()))),
    }
}

/// Parse a length. Bare numbers are pixels.
pub fn parse_length(value: &DeclarationValue, property: &str) -> Result<Length, PropertyError> {
    match value {
        DeclarationValue::Number(n) => Ok(Length::px(*n)),
        DeclarationValue::Dimension(n, unit) => match unit.as_str() {
            "px" => Ok(Length::px(*n)),
            "em" => Ok(Length::em(*n)),
            "%" => Ok(Length::percent(*n)),
            other => Err(invalid(property, format!("unknown length unit: {other}"))),
        },
        other => Err(invalid(property, format!("expected length, got: {other:?}"))),
    }
}

/// Parse 1-4 lengths into [`Sides`] (CSS shorthand).
///
/// - 1 value: all sides
/// - 2 values: vertical, horizontal
/// - 3 values: top, horizontal, bottom
/// - 4 values: top, right, bottom, left
pub fn parse_sides(values: &[DeclarationValue], property: &str) -> Result<Sides, PropertyError> {
    let lengths = values
        .iter()
        .map(|v| parse_length(v, property))
        .collect::<Result<Vec<_>, _>>()?;
    match lengths.as_slice() {
        [all] => Ok(Sides::all(*all)),
        [v, h] => Ok(Sides::symmetric(*v, *h)),
        [t, h, b] => Ok(Sides::new(*t, *h, *b, *h)),
        [t, r, b, l] => Ok(Sides::new(*t, *r, *b, *l)),
        _ => Err(invalid(property, format!("expected 1-4 values, got {}", values.len()))),
    }
}

/// Parse a time into milliseconds: `200ms`, `0.5s`, or a bare `0`.
pub fn parse_time(value: &DeclarationValue, property: &str) -> Result<u32, PropertyError> {
    let ms = match value {
        DeclarationValue::Dimension(n, unit) if unit == "ms" => *n,
        DeclarationValue::Dimension(n, unit) if unit == "s" => *n * 1000.0,
        DeclarationValue::Number(n) if *n == 0.0 => 0.0,
        other => return Err(invalid(property, format!("expected time, got: {other:?}"))),
    };
    if ms < 0.0 {
        return Err(invalid(property, "negative time"));
    }
    Ok(ms.round() as u32)
}

fn parse_color(values: &[DeclarationValue], property: &str) -> Result<String, PropertyError> {
    match require_single(values, property)? {
        DeclarationValue::Ident(name) => Ok(name.clone()),
        DeclarationValue::Color(hex) => Ok(format!("#{hex}")),
        other => Err(invalid(
            property,
            format!("expected color name or hex color, got: {other:?}"),
        )),
    }
}

fn parse_opacity(values: &[DeclarationValue]) -> Result<f32, PropertyError> {
    let n = match require_single(values, "opacity")? {
        DeclarationValue::Number(n) => *n,
        DeclarationValue::Dimension(n, unit) if unit == "%" => *n / 100.0,
        other => return Err(invalid("opacity", format!("expected number, got: {other:?}"))),
    };
    Ok(n.clamp(0.0, 1.0))
}

fn parse_property_list(values: &[DeclarationValue]) -> Result<Vec<String>, PropertyError> {
    let mut list = Vec::with_capacity(values.len());
    for value in values {
        match value {
            DeclarationValue::Ident(name) if name == "none" => {}
            DeclarationValue::Ident(name) | DeclarationValue::String(name) => {
                list.push(name.clone())
            }
            other => {
                return Err(invalid(
                    "transition-property",
                    format!("expected property name, got: {other:?}"),
                ));
            }
        }
    }
    Ok(list)
}

/// Apply one declaration to `styles`.
pub fn apply_declaration(
    styles: &mut Styles,
    property: &str,
    values: &[DeclarationValue],
) -> Result<(), PropertyError> {
    match property {
        "color" => styles.color = Some(parse_color(values, property)?),
        "background-color" => styles.background_color = Some(parse_color(values, property)?),
        "opacity" => styles.opacity = Some(parse_opacity(values)?),
        "font-size" => {
            styles.font_size = Some(parse_length(require_single(values, property)?, property)?)
        }
        "margin" => styles.margin = Some(parse_sides(values, property)?),
        "padding" => styles.padding = Some(parse_sides(values, property)?),
        "min-width" => {
            styles.min_width = Some(parse_length(require_single(values, property)?, property)?)
        }
        "min-height" => {
            styles.min_height = Some(parse_length(require_single(values, property)?, property)?)
        }
        "transition-duration" => {
            styles.transition_duration =
                Some(parse_time(require_single(values, property)?, property)?)
        }
        "transition-property" => {
            styles.transition_property = Some(parse_property_list(values)?)
        }
        // Shorthand: `transition: <property> <duration>` with either part optional.
        "transition" => {
            let mut names = Vec::new();
            for value in values {
                match value {
                    DeclarationValue::Dimension(..) => {
                        styles.transition_duration = Some(parse_time(value, property)?)
                    }
                    DeclarationValue::Ident(_) | DeclarationValue::String(_) => {
                        names.push(value.clone())
                    }
                    other => {
                        return Err(invalid(property, format!("unexpected value: {other:?}")));
                    }
                }
            }
            if !names.is_empty() {
                styles.transition_property = Some(parse_property_list(&names)?);
            }
        }
        other => return Err(PropertyError::UnknownProperty(other.to_string())),
    }

    Ok(())
}
