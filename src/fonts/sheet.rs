use super::face::FontFace;
use std::fmt::Write;

/// Render `@font-face` blocks, one per face, in the given order.
pub fn render(faces: &[FontFace]) -> String {
    let mut out = String::new();

    for face in faces.iter().filter(|f| !f.sources.is_empty()) {
        let src = face
            .sources
            .iter()
            .map(|s| format!("url(\"{}\") format(\"{}\")", s.url, s.format.extension()))
            .collect::<Vec<_>>()
            .join(", ");

        let _ = write!(
            out,
            "@font-face {{\n  font-family: \"{}\";\n  src: {src};\n  font-weight: {};\n  font-style: {};\n  font-display: swap;\n}}\n\n",
            face.family,
            face.weight,
            face.style.as_str(),
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::super::face::collect;
    use super::*;

    #[test]
    fn test_render_face() {
        let sheet = render(&collect(["Roboto-SemiBoldItalic.woff2", "Roboto-SemiBoldItalic.woff"]));
        assert_eq!(
            sheet,
            "@font-face {\n  font-family: \"Roboto\";\n  src: url(\"../fonts/Roboto-SemiBoldItalic.woff2\") format(\"woff2\"), url(\"../fonts/Roboto-SemiBoldItalic.woff\") format(\"woff\");\n  font-weight: 600;\n  font-style: italic;\n  font-display: swap;\n}\n\n"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_render_is_stable() {
        let names = ["B-Bold.woff2", "A-Light.woff", "A-Light.woff2"];
        let sheet = render(&collect(names));
        assert_eq!(sheet, render(&collect(names)));
        assert!(sheet.find("\"A\"").unwrap() < sheet.find("\"B\"").unwrap());
    }
}
