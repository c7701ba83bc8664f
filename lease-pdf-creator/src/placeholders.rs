//! `{{dotted.path}}` substitution in clause templates
//!
//! Paths resolve against the camelCase JSON form of `ContractData`, so a
//! template can reach any input field (`{{lease.monthlyRent}}`,
//! `{{tenant.nationalId}}`). Paths that do not exist in the data fall back
//! to computed aliases, which also cover the French keys the default clause
//! table uses (`{{montant_loyer}}`, `{{date_fin}}`). Anything still
//! unresolved renders as an empty string and is logged.

use chrono::{Locale, NaiveDate, NaiveTime, TimeZone, Utc};
use log::warn;
use serde_json::Value;

use crate::model::ContractData;

const MONEY_KEYS: [&str; 5] = ["rent", "amount", "price", "deposit", "charges"];

/// Resolves placeholders for one contract.
pub struct PlaceholderResolver<'a> {
    data: &'a ContractData,
    tree: Value,
}

impl<'a> PlaceholderResolver<'a> {
    pub fn new(data: &'a ContractData) -> Self {
        let tree = serde_json::to_value(data).unwrap_or(Value::Null);
        Self { data, tree }
    }

    /// Substitute every `{{...}}` token in `template`.
    ///
    /// An opening `{{` without a closing `}}` is kept as literal text.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let path = after[..end].trim();
                    match self.resolve(path) {
                        Some(value) => out.push_str(&value),
                        None => warn!("unresolved placeholder {{{{{}}}}}, rendering blank", path),
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        out.push_str(rest);
        out
    }

    /// Value for one dotted path: data lookup first, then computed aliases.
    pub fn resolve(&self, path: &str) -> Option<String> {
        self.lookup(path).or_else(|| self.alias(path))
    }

    fn lookup(&self, path: &str) -> Option<String> {
        if path.is_empty() {
            return None;
        }
        let mut node = &self.tree;
        for segment in path.split('.') {
            node = match node {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        let key = path.rsplit('.').next().unwrap_or(path);
        match node {
            Value::Null | Value::Object(_) | Value::Array(_) => None,
            Value::Bool(flag) => Some(if *flag { "oui" } else { "non" }.to_string()),
            Value::Number(n) => match n.as_u64() {
                Some(amount) if is_money_key(key) => Some(format_amount(amount)),
                _ => Some(n.to_string()),
            },
            Value::String(s) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Ok(date) => Some(format_date(date)),
                Err(_) => Some(s.clone()),
            },
        }
    }

    fn alias(&self, name: &str) -> Option<String> {
        let data = self.data;
        let lease = &data.lease;
        let value = match name {
            "adresse_bien" => data.property.address.clone(),
            "description_bien" => data.property.description.clone(),
            "type_bien" => data.property.type_label().to_string(),
            "duree_bail" => lease.duration.to_string(),
            "date_debut" => format_date(lease.start_date),
            "date_fin" | "lease.endDate" => format_date(lease.end_date()?),
            "montant_loyer" => format_amount(lease.monthly_rent),
            "jour_paiement" => lease.billing_day.to_string(),
            "montant_caution" => format_amount(lease.security_deposit),
            "mois_caution" | "lease.depositMonths" => lease.deposit_months_label(),
            "montant_charges" => format_amount(lease.charges.unwrap_or(0)),
            "loyer_total" | "lease.totalRent" => format_amount(lease.total_rent()),
            "mode_paiement" => lease.payment_method.clone()?,
            "nom_bailleur" => data.landlord.display_name(),
            "landlord.fullName" => data.landlord.full_name(),
            "nom_locataire" | "tenant.fullName" => data.tenant.full_name(),
            "ville_signature" => data.signatures.signature_city.clone(),
            "date_signature" => format_date(data.signatures.signature_date),
            _ => return None,
        };
        Some(value)
    }
}

/// Convenience wrapper for one-off substitutions.
pub fn replace_placeholders(template: &str, data: &ContractData) -> String {
    PlaceholderResolver::new(data).render(template)
}

fn is_money_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    MONEY_KEYS.iter().any(|money| key.contains(money))
}

/// Group digits by thousands with a plain space: `350000` -> `350 000`.
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// `dd MMMM yyyy` in French, e.g. `01 février 2025`.
pub fn format_date(date: NaiveDate) -> String {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
        .format_localized("%d %B %Y", Locale::fr_FR)
        .to_string()
}
