//! HTML rendering for the page shell and the per-exchange fragment.
//!
//! Templates are compiled into the binary and rendered with minijinja. The
//! `.html` names turn on HTML auto-escaping, so user and model text is always
//! inserted as text, never as markup.

use minijinja::{Environment, context};

use confidant_types::turn::Exchange;

const PAGE_TITLE: &str = "AI カウンセラー";
const PROMPT_PLACEHOLDER: &str = "悩みごとを入力してください";
const USER_LABEL: &str = "あなた";
const ASSISTANT_LABEL: &str = "AI";

/// Compiled template set.
#[derive(Debug)]
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("index.html", include_str!("../../templates/index.html"))?;
        env.add_template("exchange.html", include_str!("../../templates/exchange.html"))?;
        Ok(Self { env })
    }

    /// Full document with an empty history container.
    pub fn index_page(&self) -> Result<String, minijinja::Error> {
        self.env.get_template("index.html")?.render(context! {
            title => PAGE_TITLE,
            placeholder => PROMPT_PLACEHOLDER,
        })
    }

    /// User bubble followed by assistant bubble, appended to the history.
    pub fn exchange_fragment(&self, exchange: &Exchange) -> Result<String, minijinja::Error> {
        self.env.get_template("exchange.html")?.render(context! {
            user => exchange.user,
            assistant => exchange.assistant,
            user_label => USER_LABEL,
            assistant_label => ASSISTANT_LABEL,
        })
    }
}
