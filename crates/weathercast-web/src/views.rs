//! HTML pages.

use weathercast_weather::WeatherFormatter;

use crate::handler::WeatherView;

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto;padding:0 1rem}\
.notice{color:#a40}.error{color:#b00}pre{white-space:pre-wrap}";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        STYLE,
        body
    )
}

fn address_form(value: &str) -> String {
    format!(
        "<form action=\"/fetch_weather\" method=\"post\">\n\
<label for=\"address\">Address</label>\n\
<input type=\"text\" id=\"address\" name=\"address\" value=\"{}\">\n\
<button type=\"submit\">Get weather</button>\n\
</form>",
        escape_html(value)
    )
}

/// Landing page with the address form and an optional notice.
pub fn render_index(notice: Option<&str>) -> String {
    let mut body = String::from("<h1>Weathercast</h1>\n");
    if let Some(notice) = notice.filter(|n| !n.trim().is_empty()) {
        body.push_str(&format!("<p class=\"notice\">{}</p>\n", escape_html(notice)));
    }
    body.push_str(&address_form(""));
    page("Weathercast", &body)
}

/// Weather for one address, or the failure message.
pub fn render_weather(view: &WeatherView) -> String {
    let f = WeatherFormatter::new(&view.outcome);
    let mut body = format!(
        "<h1>Weather for {}</h1>\n<p>Postal code: {}</p>\n",
        escape_html(&view.address),
        escape_html(&view.postal_code)
    );

    if let Some(message) = view.user_error() {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(message)));
    } else {
        body.push_str(&format!(
            "<h2>{}</h2>\n<ul>\n<li>Temperature: {}°C</li>\n<li>High: {}°C</li>\n<li>Low: {}°C</li>\n<li>Conditions: {}</li>\n</ul>\n",
            escape_html(&f.name()),
            escape_html(&f.temperature()),
            escape_html(&f.max_temp()),
            escape_html(&f.min_temp()),
            escape_html(&f.condition()),
        ));
        body.push_str(&format!(
            "<h3>Forecast</h3>\n<pre>{}</pre>\n",
            escape_html(&f.formatted_forecast())
        ));
        if view.from_cache {
            body.push_str("<p><em>Result pulled from cache.</em></p>\n");
        }
    }

    body.push_str(&address_form(&view.address));
    body.push_str("\n<p><a href=\"/\">Back</a></p>");
    page("Weathercast", &body)
}

pub fn escape_html(text: &str) -> String {
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
