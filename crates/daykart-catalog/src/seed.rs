//! Products the catalog starts with when nothing has been persisted.

use std::collections::BTreeMap;

use crate::domain::product::{Category, Product};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|&v| v.to_owned()).collect()
}

/// The five seed products, ids 1 to 5.
#[must_use]
pub fn products() -> Vec<Product> {
    vec![
        Product {
            id: 1,
            name: "Luxury Memory Foam Mattress".to_owned(),
            description: "Premium memory foam mattress with cooling gel technology for the perfect night's sleep.".to_owned(),
            price: 899.0,
            original_price: Some(1199.0),
            image: "https://images.pexels.com/photos/1743229/pexels-photo-1743229.jpeg?auto=compress&cs=tinysrgb&w=800".to_owned(),
            images: Some(strings(&[
                "https://images.pexels.com/photos/1743229/pexels-photo-1743229.jpeg?auto=compress&cs=tinysrgb&w=800",
                "https://images.pexels.com/photos/164595/pexels-photo-164595.jpeg?auto=compress&cs=tinysrgb&w=800",
            ])),
            rating: 4.8,
            reviews: 124,
            category: Category::Beds,
            features: strings(&["Memory Foam", "Cooling Gel", "10-Year Warranty", "CertiPUR-US Certified"]),
            specifications: Some(BTreeMap::from([
                ("Size".to_owned(), "Queen".to_owned()),
                ("Thickness".to_owned(), "12 inches".to_owned()),
                ("Material".to_owned(), "Memory Foam".to_owned()),
                ("Firmness".to_owned(), "Medium-Firm".to_owned()),
            ])),
            is_new: None,
            collection: None,
            featured: true,
        },
        Product {
            id: 2,
            name: "Premium Fountain Pen Set".to_owned(),
            description: "Elegant fountain pen set with gold-plated nib and luxury leather case.".to_owned(),
            price: 149.0,
            original_price: None,
            image: "https://images.pexels.com/photos/1925536/pexels-photo-1925536.jpeg?auto=compress&cs=tinysrgb&w=800".to_owned(),
            images: None,
            rating: 4.6,
            reviews: 89,
            category: Category::Stationary,
            features: strings(&["Gold-Plated Nib", "Leather Case", "Refillable", "Gift Box Included"]),
            specifications: None,
            is_new: None,
            collection: None,
            featured: false,
        },
        Product {
            id: 3,
            name: "Smart Shower System".to_owned(),
            description: "Digital shower system with temperature control and water-saving technology.".to_owned(),
            price: 599.0,
            original_price: Some(799.0),
            image: "https://images.pexels.com/photos/7031406/pexels-photo-7031406.jpeg?auto=compress&cs=tinysrgb&w=800".to_owned(),
            images: None,
            rating: 4.7,
            reviews: 156,
            category: Category::Bathware,
            features: strings(&["Digital Display", "Temperature Control", "Water-Saving", "Easy Installation"]),
            specifications: None,
            is_new: None,
            collection: None,
            featured: true,
        },
        Product {
            id: 4,
            name: "Space-Saving Desk Organizer".to_owned(),
            description: "Multi-functional desk organizer perfect for small dorm rooms and study spaces.".to_owned(),
            price: 39.0,
            original_price: None,
            image: "https://images.pexels.com/photos/4226140/pexels-photo-4226140.jpeg?auto=compress&cs=tinysrgb&w=800".to_owned(),
            images: None,
            rating: 4.4,
            reviews: 203,
            category: Category::Dorm,
            features: strings(&["Space-Saving", "Multiple Compartments", "Durable Material", "Easy Assembly"]),
            specifications: None,
            is_new: None,
            collection: None,
            featured: false,
        },
        Product {
            id: 5,
            name: "Smart Home Hub".to_owned(),
            description: "Central control hub for all your smart home devices with voice control.".to_owned(),
            price: 199.0,
            original_price: None,
            image: "https://images.pexels.com/photos/4226140/pexels-photo-4226140.jpeg?auto=compress&cs=tinysrgb&w=800".to_owned(),
            images: None,
            rating: 4.9,
            reviews: 78,
            category: Category::NewCollections,
            features: strings(&["Voice Control", "WiFi Enabled", "App Integration", "Easy Setup"]),
            specifications: None,
            is_new: Some(true),
            collection: Some("Smart Home Essentials".to_owned()),
            featured: true,
        },
    ]
}
