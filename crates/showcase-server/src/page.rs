//! HTML listing page.

use std::fmt::Write;

use showcase_shared::constants::{
    APP_NAME, DESCRIPTION_PREVIEW_CHARS, FIELD_DESCRIPTION, FIELD_IMAGE, FIELD_NAME, FIELD_PRICE,
};

use crate::listing::ProductView;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;padding:2rem;background:#f4f2fb;color:#1f2937}\
h1{text-align:center}\
form{max-width:28rem;margin:0 auto 3rem;display:grid;gap:.75rem}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(16rem,1fr));gap:1.5rem}\
.card{background:#fff;border-radius:.75rem;overflow:hidden;box-shadow:0 2px 8px #0002}\
.card img{width:100%;height:16rem;object-fit:cover}\
.card div{padding:1rem}\
.price{font-weight:bold;color:#4f46e5}";

/// Render the showcase page: upload form followed by one card per product.
pub fn render(products: &[ProductView]) -> String {
    let mut html = String::with_capacity(4096);
    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{title}</title><style>{STYLE}</style></head><body>\
         <h1>{title}</h1>\
         <form action=\"/api/upload\" method=\"post\" enctype=\"multipart/form-data\">\
         <input type=\"text\" name=\"{FIELD_NAME}\" placeholder=\"Product name\" required>\
         <textarea name=\"{FIELD_DESCRIPTION}\" placeholder=\"Description\" required></textarea>\
         <input type=\"number\" name=\"{FIELD_PRICE}\" placeholder=\"Price\" min=\"0\" \
         step=\"0.01\" required>\
         <input type=\"file\" name=\"{FIELD_IMAGE}\" accept=\"image/*\" required>\
         <button type=\"submit\">Upload product</button></form>\
         <div class=\"grid\">",
        title = escape(APP_NAME),
    );

    for product in products {
        let name = escape(&product.name);
        let _ = write!(
            html,
            "<div class=\"card\"><img src=\"{src}\" alt=\"{name}\"><div>\
             <h2>{name}</h2><p>{description}</p>\
             <span class=\"price\">${price:.2}</span></div></div>",
            src = escape(&product.image_src),
            description = escape(&truncate(&product.description, DESCRIPTION_PREVIEW_CHARS)),
            price = product.price,
        );
    }

    html.push_str("</div></body></html>");
    html
}

/// Cut `text` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
    }
}

pub fn escape(text: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use showcase_shared::ProductId;

    fn view(name: &str, description: &str, price: f64) -> ProductView {
        ProductView {
            id: ProductId::new(),
            name: name.into(),
            description: description.into(),
            price,
            image_src: "data:image/png;base64,AQID".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("hello world", 6), "hello…");
        assert_eq!(truncate("ééééé", 2), "éé…");
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_cards() {
        let html = render(&[view("Mug", "Ceramic mug", 9.99), view("Lamp", "Desk lamp", 20.0)]);
        assert!(html.contains("<h2>Mug</h2>"));
        assert!(html.contains("$9.99"));
        assert!(html.contains("$20.00"));
        assert!(html.contains("src=\"data:image/png;base64,AQID\""));
        assert!(html.find("Mug").unwrap() < html.find("Lamp").unwrap());
    }

    #[test]
    fn test_render_escapes_user_text() {
        let html = render(&[view("<script>alert(1)</script>", "x", 1.0)]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_truncates_long_descriptions() {
        let long = "a".repeat(500);
        let html = render(&[view("Rug", &long, 1.0)]);
        assert!(!html.contains(&long));
        assert!(html.contains(&format!("{}…", "a".repeat(DESCRIPTION_PREVIEW_CHARS))));
    }

    #[test]
    fn test_render_empty_listing_still_has_form() {
        let html = render(&[]);
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(!html.contains("class=\"card\""));
    }
}
