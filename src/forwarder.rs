use serde::Serialize;

/// A new expense row as posted to the scripted sheet endpoint
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewExpense {
    pub date: String,
    pub tool: String,
    pub used_by: String,
    pub department: String,
    pub amount: String,
    pub currency: String,
    pub company: String,
    pub status: String,
    pub cycle: String,
    pub renewal: String,
    pub receipt: String,
    pub desc: String,
}

impl Default for NewExpense {
    fn default() -> Self {
        Self {
            date: String::new(),
            tool: String::new(),
            used_by: String::new(),
            department: String::new(),
            amount: "0".to_string(),
            currency: "USD".to_string(),
            company: String::new(),
            status: String::new(),
            cycle: String::new(),
            renewal: String::new(),
            receipt: String::new(),
            desc: String::new(),
        }
    }
}

impl NewExpense {
    /// Set a form field by name; unknown names are ignored
    pub fn set_form_field(&mut self, name: &str, value: String) {
        let slot = match name {
            "date" => &mut self.date,
            "tool" => &mut self.tool,
            "used_by" => &mut self.used_by,
            "department" => &mut self.department,
            "amount" => &mut self.amount,
            "currency" => &mut self.currency,
            "company" => &mut self.company,
            "status" => &mut self.status,
            "cycle" => &mut self.cycle,
            "renewal" => &mut self.renewal,
            "receipt" => &mut self.receipt,
            "desc" => &mut self.desc,
            _ => return,
        };
        *slot = value;
    }
}

#[cfg(feature = "web")]
pub use remote::SheetWriter;

#[cfg(feature = "web")]
mod remote {
    use log::{info, warn};
    use reqwest::Client;
    use std::time::Duration;

    use super::NewExpense;
    use crate::error::{DashboardError, Result};

    /// Fire-and-forget writer for new rows
    #[derive(Clone, Debug)]
    pub struct SheetWriter {
        client: Client,
        api_url: Option<String>,
        timeout: Duration,
    }

    impl SheetWriter {
        pub fn new(client: Client, api_url: Option<String>, timeout: Duration) -> Self {
            Self {
                client,
                api_url,
                timeout,
            }
        }

        /// Forward a row, logging (and otherwise dropping) any failure
        ///
        /// Returns whether the remote accepted the row; the web form ignores
        /// it and redirects either way.
        pub async fn send(&self, payload: &NewExpense) -> bool {
            match self.try_send(payload).await {
                Ok(()) => {
                    info!("Forwarded expense for {:?} ({})", payload.tool, payload.amount);
                    true
                }
                Err(e) => {
                    warn!("Send to sheet failed: {}", e);
                    false
                }
            }
        }

        pub async fn try_send(&self, payload: &NewExpense) -> Result<()> {
            let url = self.api_url.as_ref().ok_or(DashboardError::NoSource)?;
            let response = self
                .client
                .post(url)
                .json(payload)
                .timeout(self.timeout)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(DashboardError::RemoteStatus(status.as_u16()));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_an_empty_form() {
        let payload = NewExpense::default();
        assert_eq!(payload.amount, "0");
        assert_eq!(payload.currency, "USD");
        assert_eq!(payload.tool, "");
    }

    #[test]
    fn form_fields_fill_the_payload() {
        let mut payload = NewExpense::default();
        payload.set_form_field("tool", "Figma".into());
        payload.set_form_field("currency", "IDR".into());
        payload.set_form_field("unknown", "ignored".into());
        assert_eq!(payload.tool, "Figma");
        assert_eq!(payload.currency, "IDR");
    }

    #[test]
    fn serializes_in_sheet_column_order() {
        let json = serde_json::to_string(&NewExpense::default()).unwrap();
        let keys: Vec<&str> = json
            .trim_matches(|c| c == '{' || c == '}')
            .split(',')
            .map(|kv| kv.split(':').next().unwrap().trim_matches('"'))
            .collect();
        assert_eq!(
            keys,
            vec![
                "date", "tool", "used_by", "department", "amount", "currency", "company",
                "status", "cycle", "renewal", "receipt", "desc"
            ]
        );
    }
}
