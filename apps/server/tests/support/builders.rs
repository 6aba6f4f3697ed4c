use axum::body::Bytes;
use serde_json::json;

/// Converts a JSON value to request body bytes
pub fn to_json_body(value: &serde_json::Value) -> anyhow::Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

pub fn parse_json(body: &[u8]) -> anyhow::Result<serde_json::Value> {
    if body.is_empty() {
        return Ok(serde_json::Value::Null);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Builder for account request bodies, usable standalone or inside a payment.
#[derive(Clone)]
pub struct AccountBuilder {
    name: String,
    iban: String,
    bic: String,
    account_number: String,
    address_line1: String,
    city: Option<String>,
    country_code: String,
    with_address: bool,
}

impl AccountBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            iban: "GB12FINA1234567891".to_string(),
            bic: "BIC0001".to_string(),
            account_number: "12345".to_string(),
            address_line1: "Test St".to_string(),
            city: None,
            country_code: "GB".to_string(),
            with_address: true,
        }
    }

    pub fn iban(mut self, iban: impl Into<String>) -> Self {
        self.iban = iban.into();
        self
    }

    pub fn bic(mut self, bic: impl Into<String>) -> Self {
        self.bic = bic.into();
        self
    }

    pub fn account_number(mut self, number: impl Into<String>) -> Self {
        self.account_number = number.into();
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = code.into();
        self
    }

    pub fn without_address(mut self) -> Self {
        self.with_address = false;
        self
    }

    pub fn build(self) -> serde_json::Value {
        let mut account = json!({
            "name": self.name,
            "iban": self.iban,
            "bic": self.bic,
            "accountNumber": self.account_number,
        });
        if self.with_address {
            let mut address = json!({
                "addressLine1": self.address_line1,
                "countryCode": self.country_code,
            });
            if let Some(city) = self.city {
                address["city"] = json!(city);
            }
            account["address"] = address;
        }
        account
    }
}

/// Builder for payment request bodies.
pub struct PaymentBuilder {
    originator: Option<serde_json::Value>,
    beneficiary: Option<serde_json::Value>,
    amount: Option<serde_json::Value>,
    date: Option<String>,
    charges_bearer: Option<serde_json::Value>,
    details: Option<String>,
    reference_number: Option<String>,
}

impl PaymentBuilder {
    /// A valid payment between two distinct accounts.
    pub fn new() -> Self {
        Self {
            originator: Some(AccountBuilder::new("OriginatorAccount").build()),
            beneficiary: Some(
                AccountBuilder::new("BeneficiaryAccount")
                    .iban("GB98FINA9876543210")
                    .account_number("67890")
                    .build(),
            ),
            amount: Some(json!({ "value": "250.75", "currency": "EUR" })),
            date: None,
            charges_bearer: None,
            details: Some("Initial payment details".to_string()),
            reference_number: Some("NEWREF123".to_string()),
        }
    }

    pub fn originator(mut self, account: AccountBuilder) -> Self {
        self.originator = Some(account.build());
        self
    }

    pub fn beneficiary(mut self, account: AccountBuilder) -> Self {
        self.beneficiary = Some(account.build());
        self
    }

    pub fn amount(mut self, value: &str, currency: &str) -> Self {
        self.amount = Some(json!({ "value": value, "currency": currency }));
        self
    }

    pub fn without_amount(mut self) -> Self {
        self.amount = None;
        self
    }

    pub fn without_originator(mut self) -> Self {
        self.originator = None;
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn charges_bearer(mut self, bearer: impl Into<String>) -> Self {
        self.charges_bearer = Some(json!(bearer.into()));
        self
    }

    /// Send the charges bearer as its numeric code instead of its name.
    pub fn charges_bearer_code(mut self, code: i64) -> Self {
        self.charges_bearer = Some(json!(code));
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn reference_number(mut self, reference: impl Into<String>) -> Self {
        self.reference_number = Some(reference.into());
        self
    }

    pub fn build(self) -> serde_json::Value {
        let mut payment = json!({});
        if let Some(originator) = self.originator {
            payment["originatorAccount"] = originator;
        }
        if let Some(beneficiary) = self.beneficiary {
            payment["beneficiaryAccount"] = beneficiary;
        }
        if let Some(amount) = self.amount {
            payment["amount"] = amount;
        }
        if let Some(date) = self.date {
            payment["date"] = json!(date);
        }
        if let Some(bearer) = self.charges_bearer {
            payment["chargesBearer"] = bearer;
        }
        if let Some(details) = self.details {
            payment["details"] = json!(details);
        }
        if let Some(reference) = self.reference_number {
            payment["referenceNumber"] = json!(reference);
        }
        payment
    }
}

impl Default for PaymentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn bank_body(name: &str, bic: &str) -> serde_json::Value {
    json!({ "name": name, "bic": bic })
}
