//! The static product lineup and campaign lookbook.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Tops,
    Bottoms,
    Footwear,
    Outerwear,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tops => "Tops",
            Category::Bottoms => "Bottoms",
            Category::Footwear => "Footwear",
            Category::Outerwear => "Outerwear",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: u32,
    pub name: &'static str,
    /// Whole dollars
    pub price: u32,
    pub category: Category,
    pub image: &'static str,
    /// Whether the stylist persona is allowed to recommend this piece
    pub stylist_pick: bool,
}

/// A single frame of the campaign strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookbookFrame {
    pub label: &'static str,
    pub caption: &'static str,
    pub image: &'static str,
}

const PRODUCTS: &[Product] = &[
    Product {
        id: 1,
        name: "Rebel Jersey 99",
        price: 85,
        category: Category::Tops,
        image: "https://images.unsplash.com/photo-1577460551100-907ba84418ce?q=80&w=1000&auto=format&fit=crop",
        stylist_pick: true,
    },
    Product {
        id: 2,
        name: "Glitch Mesh Shorts",
        price: 55,
        category: Category::Bottoms,
        image: "https://images.unsplash.com/photo-1591195853828-11db59a44f6b?q=80&w=1000&auto=format&fit=crop",
        stylist_pick: true,
    },
    Product {
        id: 3,
        name: "Anarchy Combat Boots",
        price: 180,
        category: Category::Footwear,
        image: "https://images.unsplash.com/photo-1608256246200-53e635b5b65f?q=80&w=1000&auto=format&fit=crop",
        stylist_pick: true,
    },
    Product {
        id: 4,
        name: "Graffiti Denim Vest",
        price: 150,
        category: Category::Outerwear,
        image: "https://images.unsplash.com/photo-1596755094514-f87e34085b2c?q=80&w=1000&auto=format&fit=crop",
        stylist_pick: true,
    },
    Product {
        id: 5,
        name: "Splatter Hoodie",
        price: 110,
        category: Category::Outerwear,
        image: "https://images.unsplash.com/photo-1556821840-3a63f95609a7?q=80&w=1000&auto=format&fit=crop",
        stylist_pick: true,
    },
    Product {
        id: 6,
        name: "Neon High-Tops",
        price: 130,
        category: Category::Footwear,
        image: "https://images.unsplash.com/photo-1607522370275-f14206abe5d3?q=80&w=1000&auto=format&fit=crop",
        stylist_pick: false,
    },
];

const LOOKBOOK: &[LookbookFrame] = &[
    LookbookFrame {
        label: "IMG_001.RAW",
        caption: "Car lifestyle",
        image: "https://images.unsplash.com/photo-1492144534655-ae79c964c9d7?q=80&w=1000&auto=format&fit=crop",
    },
    LookbookFrame {
        label: "IMG_002.RAW",
        caption: "Dark gritty portrait",
        image: "https://images.unsplash.com/photo-1614165936126-2ed18e471b10?q=80&w=1000&auto=format&fit=crop",
    },
    LookbookFrame {
        label: "IMG_003.RAW",
        caption: "Urban group",
        image: "https://images.unsplash.com/photo-1552374196-c4e7ffc6e126?q=80&w=1000&auto=format&fit=crop",
    },
    LookbookFrame {
        label: "IMG_004.RAW",
        caption: "Sitting on the hood",
        image: "https://images.unsplash.com/photo-1535713875002-d1d0cf377fde?q=80&w=1000&auto=format&fit=crop",
    },
];

pub fn products() -> &'static [Product] {
    PRODUCTS
}

pub fn find(id: u32) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.id == id)
}

pub fn lookbook() -> &'static [LookbookFrame] {
    LOOKBOOK
}

/// Names the stylist persona knows about, in catalog order
pub fn recommendable() -> Vec<&'static str> {
    PRODUCTS
        .iter()
        .filter(|p| p.stylist_pick)
        .map(|p| p.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<u32> = products().iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), products().len());
    }

    #[test]
    fn test_find() {
        assert_eq!(find(3).map(|p| p.name), Some("Anarchy Combat Boots"));
        assert!(find(42).is_none());
    }

    #[test]
    fn test_recommendable_excludes_high_tops() {
        let names = recommendable();
        assert_eq!(names.len(), 5);
        assert!(names.contains(&"Splatter Hoodie"));
        assert!(!names.contains(&"Neon High-Tops"));
    }

    #[test]
    fn test_lookbook_labels() {
        let labels: Vec<&str> = lookbook().iter().map(|f| f.label).collect();
        assert_eq!(labels, ["IMG_001.RAW", "IMG_002.RAW", "IMG_003.RAW", "IMG_004.RAW"]);
    }
}
