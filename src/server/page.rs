use crate::config::persona::Persona;

const INDEX_TEMPLATE: &str = include_str!("index.html");

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Fills `{{key}}` slots in one pass, so substituted text is never rescanned.
pub fn render_index(persona: &Persona) -> String {
    let mut out = String::with_capacity(INDEX_TEMPLATE.len());
    let mut rest = INDEX_TEMPLATE;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        match &after[..end] {
            "title" => out.push_str(&escape_html(&persona.title)),
            "name" => out.push_str(&escape_html(&persona.name)),
            "greeting" => out.push_str(&escape_html(&persona.greeting)),
            other => {
                out.push_str("{{");
                out.push_str(other);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}
