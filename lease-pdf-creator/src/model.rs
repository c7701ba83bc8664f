//! Lease contract input records
//!
//! A `ContractData` value is built by the caller for one document request and
//! consumed read-only by the engine. Field names serialize in camelCase so the
//! same JSON the web application already produces can be fed in directly, and
//! so `{{lease.monthlyRent}}`-style placeholders resolve against it.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Everything needed to lay out one residential lease contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractData {
    pub landlord: Landlord,
    pub tenant: Tenant,
    pub property: Property,
    pub lease: LeaseTerms,
    pub signatures: Signatures,
    /// Free-text particular clauses, rendered numbered after the articles.
    #[serde(default)]
    pub additional_clauses: Vec<String>,
}

/// Owner side of the lease (a person or a company).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Landlord {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub company_name: Option<String>,
    /// Senegalese tax identification number.
    #[serde(default)]
    pub ninea: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub birth_place: Option<String>,
}

impl Landlord {
    /// Company name when present, otherwise "first last".
    pub fn display_name(&self) -> String {
        match non_blank(self.company_name.as_deref()) {
            Some(company) => company.to_string(),
            None => join_name(&self.first_name, &self.last_name),
        }
    }

    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    /// CNI or passport number.
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub birth_place: Option<String>,
}

impl Tenant {
    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Appartement,
    Maison,
    Villa,
    Studio,
    Bureau,
}

impl PropertyType {
    pub fn label(&self) -> &'static str {
        match self {
            PropertyType::Appartement => "Appartement",
            PropertyType::Maison => "Maison",
            PropertyType::Villa => "Villa",
            PropertyType::Studio => "Studio",
            PropertyType::Bureau => "Bureau",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub property_type: Option<PropertyType>,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub building_name: Option<String>,
}

impl Property {
    pub fn type_label(&self) -> &'static str {
        self.property_type.map_or("Logement", |t| t.label())
    }
}

/// Financial and calendar terms. Amounts are whole FCFA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseTerms {
    pub monthly_rent: u64,
    pub security_deposit: u64,
    #[serde(default)]
    pub deposit_months: Option<u32>,
    pub start_date: NaiveDate,
    /// Length of the lease in months.
    pub duration: u32,
    /// Day of the month the rent is due.
    pub billing_day: u8,
    #[serde(default)]
    pub charges: Option<u64>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl LeaseTerms {
    /// Start date shifted by `duration` months, `None` on calendar overflow.
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.start_date.checked_add_months(Months::new(self.duration))
    }

    /// Monthly rent plus separate charges.
    pub fn total_rent(&self) -> u64 {
        self.monthly_rent.saturating_add(self.charges.unwrap_or(0))
    }

    /// Deposit expressed in months of rent, e.g. "2" or "1,5".
    pub fn deposit_months_label(&self) -> String {
        if let Some(months) = self.deposit_months {
            return months.to_string();
        }
        if self.monthly_rent == 0 {
            return String::new();
        }
        let tenths = self.security_deposit.saturating_mul(10) / self.monthly_rent;
        if tenths % 10 == 0 {
            (tenths / 10).to_string()
        } else {
            format!("{},{}", tenths / 10, tenths % 10)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signatures {
    #[serde(default)]
    pub landlord_signature_url: Option<String>,
    #[serde(default)]
    pub tenant_signature_url: Option<String>,
    pub signature_date: NaiveDate,
    #[serde(default)]
    pub signature_city: String,
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn join_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim()).trim().to_string()
}
