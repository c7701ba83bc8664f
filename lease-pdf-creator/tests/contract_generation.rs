use lease_pdf_creator::{
    ClauseOverrides, ContractData, GenerationError, GenerationOptions, InMemoryImageSource,
    LayoutConfig, LeaseContractEngine,
};
use pretty_assertions::assert_eq;

fn dakar_lease() -> ContractData {
    serde_json::from_value(serde_json::json!({
        "landlord": {
            "firstName": "Amadou",
            "lastName": "Diallo",
            "companyName": "Diallo Immobilier SARL",
            "ninea": "987654321",
            "address": "123 Avenue Cheikh Anta Diop, Dakar, Sénégal",
            "phone": "+221 77 123 45 67",
            "email": "amadou.diallo@example.com"
        },
        "tenant": {
            "firstName": "Fatou",
            "lastName": "Sene",
            "phone": "+221 76 987 65 43",
            "email": "fatou.sene@example.com",
            "nationalId": "CNI 1234567890123"
        },
        "property": {
            "address": "Résidence Les Almadies, Immeuble B, Appartement 304, Dakar",
            "description": "3 chambres, 1 salon, 1 cuisine équipée, 2 salles de bain",
            "propertyType": "appartement"
        },
        "lease": {
            "monthlyRent": 350000,
            "securityDeposit": 700000,
            "startDate": "2025-02-01",
            "duration": 12,
            "billingDay": 5,
            "charges": 25000
        },
        "signatures": {
            "signatureDate": "2025-01-15",
            "signatureCity": "Dakar"
        }
    }))
    .unwrap()
}

fn engine() -> LeaseContractEngine {
    LeaseContractEngine::new(LayoutConfig::default())
        .unwrap()
        .with_image_source(InMemoryImageSource::new())
}

fn png_signature() -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, 4, 2);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[0u8, 0, 0, 200].repeat(8)).unwrap();
    }
    out
}

#[test]
fn valid_contract_produces_a_pdf() {
    let contract = engine()
        .generate(&dakar_lease(), &ClauseOverrides::default(), &GenerationOptions::default())
        .unwrap();
    assert!(contract.bytes.starts_with(b"%PDF"));
}

#[test]
fn zero_rent_is_rejected_before_drawing() {
    let mut data = dakar_lease();
    data.lease.monthly_rent = 0;
    data.lease.security_deposit = 0;

    match engine().generate(&data, &ClauseOverrides::default(), &GenerationOptions::default()) {
        Err(GenerationError::Validation(errors)) => {
            assert!(errors.has_field("lease.monthlyRent"));
            assert!(errors.to_string().contains("loyer"));
        }
        other => panic!("expected a validation error, got {:?}", other.map(|c| c.page_count)),
    }
}

#[test]
fn deposit_above_two_months_is_rejected() {
    let mut data = dakar_lease();
    data.lease.security_deposit = 700_001;

    let err = engine()
        .generate(&data, &ClauseOverrides::default(), &GenerationOptions::default())
        .unwrap_err();
    assert!(matches!(&err, GenerationError::Validation(e) if e.has_field("lease.securityDeposit")));
    assert!(err.to_string().contains("2 mois de loyer"));
}

#[test]
fn standard_lease_spans_pages_with_numbered_footers() {
    let contract = engine()
        .generate(&dakar_lease(), &ClauseOverrides::default(), &GenerationOptions::default())
        .unwrap();
    assert!(contract.page_count >= 2);

    let total = contract.page_count;
    for (index, page) in contract.text_layer.pages.iter().enumerate() {
        let footer = format!("Page {} sur {}", index + 1, total);
        assert!(page.contains(&footer), "page {} lacks {:?}", index + 1, footer);
    }

    let pdf = lopdf::Document::load_mem(&contract.bytes).unwrap();
    assert_eq!(pdf.get_pages().len(), total);
}

#[test]
fn placeholders_are_substituted_in_articles() {
    let contract = engine()
        .generate(&dakar_lease(), &ClauseOverrides::default(), &GenerationOptions::default())
        .unwrap();
    let text = contract.text_layer.plain_text();

    assert!(text.contains("350 000 FCFA"));
    assert!(text.contains("700 000 FCFA"));
    assert!(text.contains("01 février 2025"));
    assert!(text.contains("01 février 2026"));
    assert!(!text.contains("{{"));
}

#[test]
fn articles_appear_in_order_and_signatures_close_the_document() {
    let contract = engine()
        .generate(&dakar_lease(), &ClauseOverrides::default(), &GenerationOptions::default())
        .unwrap();
    let layer = &contract.text_layer;

    let mut previous = 0;
    for n in 1..=17 {
        let pages = layer.pages_containing(&format!("ARTICLE {} :", n));
        assert_eq!(pages.len(), 1, "article {} title printed once", n);
        assert!(pages[0] >= previous);
        previous = pages[0];
    }

    let last = contract.page_count as u32;
    assert_eq!(layer.pages_containing("SIGNATURES"), vec![last]);
    assert_eq!(layer.pages_containing("Fait à Dakar, le 15 janvier 2025"), vec![last]);
    assert_eq!(layer.pages_containing("Lu et approuvé").len(), 1);
}

#[test]
fn generation_is_deterministic() {
    let engine = engine();
    let data = dakar_lease();
    let overrides = ClauseOverrides::default().with_custom_clauses("Le parking P-12 est inclus.");
    let options = GenerationOptions {
        watermark: Some("BROUILLON".into()),
        logo_url: None,
    };

    let first = engine.generate(&data, &overrides, &options).unwrap();
    let second = engine.generate(&data, &overrides, &options).unwrap();
    assert_eq!(first.page_count, second.page_count);
    assert_eq!(first.text_layer, second.text_layer);
    assert!(first.bytes == second.bytes);
}

#[test]
fn shared_engine_serves_concurrent_calls() {
    let engine = engine();
    let data = dakar_lease();
    let reference = engine
        .generate(&data, &ClauseOverrides::default(), &GenerationOptions::default())
        .unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    engine
                        .generate(&data, &ClauseOverrides::default(), &GenerationOptions::default())
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().bytes == reference.bytes);
        }
    });
}

#[test]
fn unreachable_signatures_do_not_fail_generation() {
    let mut data = dakar_lease();
    data.signatures.landlord_signature_url = Some("https://storage.invalid/landlord.png".into());
    data.signatures.tenant_signature_url = Some("tenant.gif".into());

    let contract = engine()
        .generate(&data, &ClauseOverrides::default(), &GenerationOptions::default())
        .unwrap();
    assert!(contract.bytes.starts_with(b"%PDF"));
}

#[test]
fn signature_images_are_embedded_once_each() {
    let mut data = dakar_lease();
    data.signatures.landlord_signature_url = Some("landlord.png".into());
    data.signatures.tenant_signature_url = Some("tenant.png".into());
    let engine = LeaseContractEngine::new(LayoutConfig::default())
        .unwrap()
        .with_image_source(
            InMemoryImageSource::new()
                .with_image("landlord.png", png_signature())
                .with_image("tenant.png", png_signature()),
        );

    let contract = engine
        .generate(&data, &ClauseOverrides::default(), &GenerationOptions::default())
        .unwrap();
    let pdf = lopdf::Document::load_mem(&contract.bytes).unwrap();
    let images = pdf
        .objects
        .values()
        .filter_map(|object| object.as_stream().ok())
        .filter(|stream| {
            stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .map_or(false, |name| name == b"Image")
        })
        .count();
    // Two signatures, each with a soft mask.
    assert_eq!(images, 4);
}

#[test]
fn overrides_and_particular_conditions_are_rendered() {
    let mut data = dakar_lease();
    data.additional_clauses = vec!["Le Preneur pourra installer une climatisation.".into()];
    let overrides = ClauseOverrides::default()
        .with_text("article_5_charges", "Charges forfaitaires de {{lease.charges}} FCFA par mois.")
        .with_custom_clauses("Animaux domestiques interdits.");

    let contract = engine()
        .generate(&data, &overrides, &GenerationOptions::default())
        .unwrap();
    let layer = &contract.text_layer;

    assert_eq!(layer.pages_containing("Charges forfaitaires de 25 000 FCFA par mois.").len(), 1);
    assert!(layer.pages_containing("- vidange de fosse septique").is_empty());
    assert_eq!(layer.pages_containing("CONDITIONS PARTICULIÈRES").len(), 1);
    assert_eq!(layer.pages_containing("Animaux domestiques interdits.").len(), 1);
    assert_eq!(
        layer
            .pages_containing("1. Le Preneur pourra installer une climatisation.")
            .len(),
        1
    );
}

#[test]
fn particular_conditions_keep_braces_as_typed() {
    let mut data = dakar_lease();
    data.additional_clauses = vec!["Badge {{lease.monthlyRent}} non remboursable.".into()];
    let overrides = ClauseOverrides::default().with_custom_clauses("Code portail {{1234}} fourni.");

    let contract = engine()
        .generate(&data, &overrides, &GenerationOptions::default())
        .unwrap();
    let layer = &contract.text_layer;

    assert_eq!(layer.pages_containing("Code portail {{1234}} fourni.").len(), 1);
    assert_eq!(
        layer
            .pages_containing("1. Badge {{lease.monthlyRent}} non remboursable.")
            .len(),
        1
    );
}

#[test]
fn watermark_is_stamped_on_every_page() {
    let options = GenerationOptions {
        watermark: Some("BROUILLON".into()),
        logo_url: None,
    };
    let contract = engine()
        .generate(&dakar_lease(), &ClauseOverrides::default(), &options)
        .unwrap();
    let expected: Vec<u32> = (1..=contract.page_count as u32).collect();
    assert_eq!(contract.text_layer.pages_containing("BROUILLON"), expected);
}
