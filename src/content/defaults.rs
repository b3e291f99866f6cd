// Compiled-in fallback content
// Served whenever the backend is unreachable, unconfigured or empty

use serde_json::{json, Value};
use std::sync::LazyLock;

use super::merge::ContentDocument;

static DEFAULT_CONTENT: LazyLock<ContentDocument> = LazyLock::new(|| match default_value() {
    Value::Object(map) => map,
    _ => ContentDocument::new(),
});

/// Process-wide default document
pub fn default_content() -> &'static ContentDocument {
    &DEFAULT_CONTENT
}

fn default_value() -> Value {
    json!({
        "siteName": "The Crescents",
        "heroTitle": "Luxury Freehold Townhomes & Singles in Brampton",
        "heroSubtitle": "An exclusive enclave at Kennedy & Mayfield",
        "heroImage": "/images/hero.jpg",
        "ctaPrimaryText": "Register Now",
        "ctaSecondaryText": "View Floor Plans",
        "aboutTitle": "Opulent Living, Exceptional Connectivity",
        "aboutDescription": "The Crescents brings premium features and thoughtful design to a quiet Brampton neighbourhood, minutes from highways, schools and parks.",
        "features": [
            {
                "title": "Freehold Townhomes",
                "description": "No condo fees, with private backyards and attached garages."
            },
            {
                "title": "Single-Family Homes",
                "description": "Spacious detached homes on generous lots."
            },
            {
                "title": "Premium Finishes",
                "description": "Nine-foot ceilings, hardwood floors and quartz countertops."
            }
        ],
        "galleryImages": [
            "/images/gallery-1.jpg",
            "/images/gallery-2.jpg",
            "/images/gallery-3.jpg"
        ],
        "sections": {
            "showFeatures": true,
            "showGallery": true,
            "showFloorPlans": true,
            "showLocation": true,
            "showContact": true
        },
        "locationTitle": "Kennedy & Mayfield",
        "locationDescription": "Close to Highway 410, shopping, golf courses and conservation areas.",
        "contactTitle": "Register for VIP Access",
        "contactPhone": "",
        "contactEmail": "",
        "footerText": "Prices and specifications subject to change without notice. E.&O.E."
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_populated() {
        let defaults = default_content();
        assert!(!defaults.is_empty());
        assert!(defaults.contains_key("heroTitle"));
        assert!(defaults["sections"].is_object());
    }

    #[test]
    fn test_defaults_do_not_use_reserved_key() {
        assert!(!default_content().contains_key(super::super::DEBUG_KEY));
    }
}
