use tera::{Context, Tera};

use crate::models::dto::ScreenerQuery;
use crate::models::stock;

const HOME_TEMPLATE: &str = "home.html";
const MADE_WITH: &str = "❤️";

/// Rendu HTML du screener. Les templates sont embarqués dans le binaire.
pub struct Dashboard {
    tera: Tera,
}

impl Dashboard {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(HOME_TEMPLATE, include_str!("../../templates/home.html"))?;
        Ok(Self { tera })
    }

    /// Affiche la liste filtrée et renvoie les paramètres saisis au formulaire
    pub fn render(&self, stocks: &[stock::Model], query: &ScreenerQuery) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("stocks", stocks);
        context.insert("forward_pe", &query.forward_pe);
        context.insert("dividend_yield", &query.dividend_yield);
        context.insert("ma50", &query.ma50_flag());
        context.insert("ma200", &query.ma200_flag());
        context.insert("made_with", MADE_WITH);

        self.tera.render(HOME_TEMPLATE, &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn stock(symbol: &str) -> stock::Model {
        stock::Model {
            id: 1,
            symbol: symbol.to_string(),
            price: Decimal::new(15050, 2),
            forward_pe: Decimal::new(215, 1),
            forward_eps: Decimal::ZERO,
            dividend_yield: Decimal::new(25, 1),
            ma50: Decimal::ZERO,
            ma200: Decimal::ZERO,
        }
    }

    #[test]
    fn test_render_lists_stocks_and_echoes_params() {
        let dashboard = Dashboard::new().unwrap();
        let query = ScreenerQuery {
            forward_pe: Some("10".to_string()),
            ma50: Some("true".to_string()),
            ..Default::default()
        };

        let html = dashboard.render(&[stock("AAPL")], &query).unwrap();
        assert!(html.contains("<td>AAPL</td>"));
        assert!(html.contains("150.5"));
        assert!(html.contains(r#"name="forward_pe" value="10""#));
        assert!(html.contains(r#"value="true" checked"#));
    }

    #[test]
    fn test_render_escapes_symbol() {
        let dashboard = Dashboard::new().unwrap();
        let html = dashboard
            .render(&[stock("<b>X</b>")], &ScreenerQuery::default())
            .unwrap();
        assert!(!html.contains("<b>X</b>"));
        assert!(html.contains("&lt;b&gt;X"));
    }

    #[test]
    fn test_render_empty() {
        let dashboard = Dashboard::new().unwrap();
        let html = dashboard.render(&[], &ScreenerQuery::default()).unwrap();
        assert!(html.contains("No stocks match."));
    }
}
