//! `@font-face` metadata inferred from file names.
//!
//! `Roboto-SemiBoldItalic.woff2` → family `Roboto`, weight 600, italic.

use crate::tools::WebFontFormat;
use std::{collections::BTreeMap, path::Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSource {
    pub format: WebFontFormat,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    pub family: String,
    pub weight: u16,
    pub style: FontStyle,
    pub sources: Vec<FontSource>,
}

/// Numeric weight of a lowercased weight token.
fn weight(token: &str) -> Option<u16> {
    Some(match token {
        "thin" | "hairline" => 100,
        "extralight" | "extra light" => 200,
        "light" => 300,
        "regular" | "normal" => 400,
        "medium" => 500,
        "semibold" | "semi bold" => 600,
        "bold" => 700,
        "extrabold" | "extra bold" => 800,
        "black" | "heavy" => 900,
        _ => return None,
    })
}

/// Family, weight and style of a font file stem, without sources.
///
/// The part after the last hyphen is the weight token, optionally carrying
/// `Italic`. Unknown tokens fall back to 400.
pub fn infer(stem: &str) -> FontFace {
    let (family, weight, style) = match stem.rsplit_once('-') {
        Some((family, suffix)) => {
            let suffix = suffix.to_lowercase();
            let style = if suffix.contains("italic") {
                FontStyle::Italic
            } else {
                FontStyle::Normal
            };
            let token = suffix.replacen("italic", "", 1);
            (family, weight(token.trim()).unwrap_or(400), style)
        }
        None => {
            let style = if stem.to_lowercase().contains("italic") {
                FontStyle::Italic
            } else {
                FontStyle::Normal
            };
            (stem, 400, style)
        }
    };

    FontFace {
        family: family.to_owned(),
        weight,
        style,
        sources: Vec::new(),
    }
}

/// Faces for a directory listing of web fonts, in stem order.
///
/// Files are grouped by stem; anything that is not `.woff`/`.woff2` is
/// ignored. Sources list woff2 before woff.
pub fn collect<I, S>(file_names: I) -> Vec<FontFace>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups: BTreeMap<String, [Option<String>; 2]> = BTreeMap::new();

    for name in file_names {
        let name = name.as_ref();
        let path = Path::new(name);
        let (Some(stem), Some(ext)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.extension().and_then(|e| e.to_str()),
        ) else {
            continue;
        };
        let slot = match ext.to_ascii_lowercase().as_str() {
            "woff2" => 0,
            "woff" => 1,
            _ => continue,
        };
        groups.entry(stem.to_owned()).or_default()[slot] = Some(name.to_owned());
    }

    groups
        .into_iter()
        .map(|(stem, files)| {
            let mut face = infer(&stem);
            face.sources = [WebFontFormat::Woff2, WebFontFormat::Woff]
                .into_iter()
                .zip(files)
                .filter_map(|(format, file)| {
                    file.map(|file| FontSource {
                        format,
                        url: format!("../fonts/{file}"),
                    })
                })
                .collect();
            face
        })
        .collect()
}
