use super::exchange::{PendingExchange, ResponseMeta};

/// What the intercept window currently shows. The request text is operator-editable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct DisplayState {
    pub(crate) request: String,
    pub(crate) response: String,
    revision: u64,
}

impl DisplayState {
    /// Bumped on every controller-side render so views know their copy is stale.
    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn show_exchange(&mut self, exchange: &PendingExchange) {
        self.request = render_request(exchange);
        self.response = match exchange.response() {
            Some(response) => render_response(response),
            None => String::new()
        };
        self.revision += 1;
    }

    pub(crate) fn show_response(&mut self, response: &ResponseMeta) {
        self.response = render_response(response);
        self.revision += 1;
    }

    /// Operator edits do not bump the revision: the view already shows them.
    pub(crate) fn set_edited_request(&mut self, text: String) {
        self.request = text;
    }

    pub(crate) fn blank(&mut self) {
        self.request.clear();
        self.response.clear();
        self.revision += 1;
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.request.is_empty() && self.response.is_empty()
    }
}

fn push_headers(text: &mut String, headers: &[(String, String)]) {
    text.push('\n');
    for (name, value) in headers {
        text.push_str(name);
        text.push_str(": ");
        text.push_str(value);
        text.push('\n');
    }
}

pub(crate) fn render_request(exchange: &PendingExchange) -> String {
    let mut text = format!("Method: {}\nURI: {}\n", exchange.method(), exchange.uri());
    push_headers(&mut text, exchange.request_headers());
    text
}

pub(crate) fn render_response(response: &ResponseMeta) -> String {
    let mut text = format!("Status: {}\nContent-Type: {}\n", response.status_code, response.content_type);
    push_headers(&mut text, &response.headers);
    text
}
