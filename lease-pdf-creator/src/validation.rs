//! Precondition checks run before any drawing happens.

use crate::error::ValidationErrors;
use crate::model::{non_blank, ContractData};

/// Legal ceiling on the security deposit, in months of rent.
pub const MAX_DEPOSIT_MONTHS: u64 = 2;

/// Collect every field violation in `data`. An empty result means the
/// contract can be rendered.
pub fn validate_contract(data: &ContractData) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if non_blank(Some(&data.landlord.first_name)).is_none()
        && non_blank(data.landlord.company_name.as_deref()).is_none()
    {
        errors.push(
            "landlord.firstName",
            "Le nom du bailleur ou la raison sociale est requis",
        );
    }
    if non_blank(Some(&data.landlord.address)).is_none() {
        errors.push("landlord.address", "L'adresse du bailleur est requise");
    }
    if non_blank(Some(&data.landlord.phone)).is_none() {
        errors.push("landlord.phone", "Le téléphone du bailleur est requis");
    }

    if non_blank(Some(&data.tenant.first_name)).is_none()
        || non_blank(Some(&data.tenant.last_name)).is_none()
    {
        errors.push("tenant.lastName", "Le nom complet du locataire est requis");
    }
    if non_blank(Some(&data.tenant.phone)).is_none() {
        errors.push("tenant.phone", "Le téléphone du locataire est requis");
    }

    if non_blank(Some(&data.property.address)).is_none() {
        errors.push("property.address", "L'adresse du bien est requise");
    }
    if non_blank(Some(&data.property.description)).is_none() {
        errors.push("property.description", "La description du bien est requise");
    }

    let lease = &data.lease;
    if lease.monthly_rent == 0 {
        errors.push(
            "lease.monthlyRent",
            "Le montant du loyer est requis et doit être positif",
        );
    }
    if lease.security_deposit == 0 {
        errors.push("lease.securityDeposit", "Le montant de la caution est requis");
    } else if lease.security_deposit > lease.monthly_rent.saturating_mul(MAX_DEPOSIT_MONTHS) {
        errors.push(
            "lease.securityDeposit",
            "La caution ne peut excéder 2 mois de loyer (loi sénégalaise)",
        );
    }
    if lease.duration == 0 {
        errors.push("lease.duration", "La durée du bail est requise");
    }

    if non_blank(Some(&data.signatures.signature_city)).is_none() {
        errors.push("signatures.signatureCity", "Le lieu de signature est requis");
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::dakar_lease;

    #[test]
    fn complete_contract_passes() {
        assert!(validate_contract(&dakar_lease()).is_empty());
    }

    #[test]
    fn deposit_of_exactly_two_months_is_allowed() {
        let mut data = dakar_lease();
        data.lease.security_deposit = data.lease.monthly_rent * 2;
        assert!(validate_contract(&data).is_empty());
    }

    #[test]
    fn zero_rent_is_rejected() {
        let mut data = dakar_lease();
        data.lease.monthly_rent = 0;
        data.lease.security_deposit = 0;
        let errors = validate_contract(&data);
        assert_eq!(errors.len(), 2);
        assert!(errors.has_field("lease.monthlyRent"));
        assert!(errors.has_field("lease.securityDeposit"));
    }

    #[test]
    fn missing_deposit_is_rejected() {
        let mut data = dakar_lease();
        data.lease.security_deposit = 0;
        let errors = validate_contract(&data);
        assert_eq!(errors.len(), 1);
        assert!(errors.to_string().contains("caution est requis"));
    }

    #[test]
    fn contact_fields_are_required() {
        let cases: [(&str, fn(&mut ContractData)); 5] = [
            ("landlord.address", |d| d.landlord.address.clear()),
            ("landlord.phone", |d| d.landlord.phone = " ".into()),
            ("tenant.phone", |d| d.tenant.phone.clear()),
            ("property.description", |d| d.property.description.clear()),
            ("signatures.signatureCity", |d| d.signatures.signature_city = "\t".into()),
        ];
        for (field, blank) in cases {
            let mut data = dakar_lease();
            blank(&mut data);
            let errors = validate_contract(&data);
            assert_eq!(errors.len(), 1, "{}", field);
            assert!(errors.has_field(field), "{}", field);
        }
    }

    #[test]
    fn deposit_above_ceiling_is_rejected() {
        let mut data = dakar_lease();
        data.lease.security_deposit = 700_001;
        let errors = validate_contract(&data);
        assert!(errors.has_field("lease.securityDeposit"));
        assert!(errors.to_string().contains("2 mois"));
    }

    #[test]
    fn all_violations_are_reported_together() {
        let mut data = dakar_lease();
        data.landlord.first_name.clear();
        data.landlord.company_name = None;
        data.tenant.last_name = "  ".into();
        data.property.address.clear();
        data.lease.duration = 0;
        data.signatures.signature_city.clear();
        let errors = validate_contract(&data);
        assert_eq!(errors.len(), 5);
        assert!(errors.has_field("landlord.firstName"));
        assert!(errors.has_field("tenant.lastName"));
        assert!(errors.has_field("property.address"));
        assert!(errors.has_field("lease.duration"));
        assert!(errors.has_field("signatures.signatureCity"));
    }
}
