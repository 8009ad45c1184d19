//! # Product Catalog
//!
//! The shop's static product list and category table.
//!
//! The catalog is seed data compiled into the binary. It is built once on
//! first access and never mutated; every product id follows the
//! `PREFIX-TIMESTAMP-RANDOM` format with the prefix of its category.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Categories
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    /// Slug used in filters (`nuts`, `spices`, `dry-fruits`).
    pub id: String,
    pub name: String,
    /// Product id prefix (`NUT`, `SPC`, `DRF`).
    pub prefix: String,
}

const CATEGORY_TABLE: [(&str, &str, &str); 3] = [
    ("nuts", "Premium Nuts", "NUT"),
    ("spices", "Whole Spices", "SPC"),
    ("dry-fruits", "Dry Fruits", "DRF"),
];

/// Weight buckets offered by the shop filter. `all` disables the filter.
pub const WEIGHT_OPTIONS: [&str; 5] = ["all", "100g", "250g", "500g", "1kg"];

/// Category id that matches every product.
pub const ALL_CATEGORIES: &str = "all";

static CATEGORIES: LazyLock<Vec<Category>> = LazyLock::new(|| {
    CATEGORY_TABLE
        .iter()
        .map(|(id, name, prefix)| Category {
            id: id.to_string(),
            name: name.to_string(),
            prefix: prefix.to_string(),
        })
        .collect()
});

pub fn categories() -> &'static [Category] {
    &CATEGORIES
}

pub fn find_category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

// =============================================================================
// Products
// =============================================================================

struct Seed {
    id: &'static str,
    name: &'static str,
    price: i64,
    original_price: Option<i64>,
    category: &'static str,
    image: &'static str,
    description: &'static str,
    weight: &'static str,
    nutritional_info: &'static str,
    in_stock: bool,
    featured: bool,
    rating: f32,
    reviews: u32,
}

const SEED: &[Seed] = &[
    Seed {
        id: "NUT-1709123456789-ABC123",
        name: "California Almonds",
        price: 899,
        original_price: Some(1099),
        category: "nuts",
        image: "/images/products/california-almonds.jpg",
        description: "Crunchy, naturally sweet almonds sourced from California orchards.",
        weight: "500g",
        nutritional_info: "Protein 21g, Fibre 12g, Vitamin E 25mg per 100g",
        in_stock: true,
        featured: true,
        rating: 4.8,
        reviews: 342,
    },
    Seed {
        id: "NUT-1709123456790-CSH451",
        name: "Whole Cashews W240",
        price: 1149,
        original_price: Some(1299),
        category: "nuts",
        image: "/images/products/cashews-w240.jpg",
        description: "Large creamy cashew kernels from Goa, graded W240.",
        weight: "500g",
        nutritional_info: "Protein 18g, Fat 44g, Iron 6.7mg per 100g",
        in_stock: true,
        featured: true,
        rating: 4.7,
        reviews: 289,
    },
    Seed {
        id: "NUT-1709123456791-PST782",
        name: "Roasted Salted Pistachios",
        price: 649,
        original_price: None,
        category: "nuts",
        image: "/images/products/pistachios.jpg",
        description: "In-shell pistachios, slow roasted with a light pinch of sea salt.",
        weight: "250g",
        nutritional_info: "Protein 20g, Fibre 10g, Potassium 1025mg per 100g",
        in_stock: true,
        featured: false,
        rating: 4.6,
        reviews: 198,
    },
    Seed {
        id: "NUT-1709123456792-WLN318",
        name: "Kashmiri Walnut Kernels",
        price: 749,
        original_price: Some(849),
        category: "nuts",
        image: "/images/products/walnut-kernels.jpg",
        description: "Light halves of Kashmiri walnuts, rich in omega-3.",
        weight: "250g",
        nutritional_info: "Omega-3 9g, Protein 15g, Fibre 7g per 100g",
        in_stock: true,
        featured: false,
        rating: 4.5,
        reviews: 156,
    },
    Seed {
        id: "NUT-1709123456793-MCD907",
        name: "Macadamia Nuts",
        price: 1899,
        original_price: Some(2199),
        category: "nuts",
        image: "/images/products/macadamia.jpg",
        description: "Buttery macadamia nuts, dry roasted and unsalted.",
        weight: "500g",
        nutritional_info: "Fat 76g, Protein 8g, Manganese 4.1mg per 100g",
        in_stock: true,
        featured: false,
        rating: 4.4,
        reviews: 87,
    },
    Seed {
        id: "NUT-1709123456794-PCN264",
        name: "Pecan Halves",
        price: 2799,
        original_price: None,
        category: "nuts",
        image: "/images/products/pecans.jpg",
        description: "Hand-sorted pecan halves with a mellow, maple-like flavour.",
        weight: "1kg",
        nutritional_info: "Fat 72g, Fibre 10g, Zinc 4.5mg per 100g",
        in_stock: false,
        featured: false,
        rating: 4.3,
        reviews: 41,
    },
    Seed {
        id: "SPC-1709123456795-CRD513",
        name: "Green Cardamom",
        price: 499,
        original_price: Some(599),
        category: "spices",
        image: "/images/products/green-cardamom.jpg",
        description: "Bold 8mm pods from the Idukki hills with an intense aroma.",
        weight: "100g",
        nutritional_info: "Fibre 28g, Manganese 28mg per 100g",
        in_stock: true,
        featured: true,
        rating: 4.9,
        reviews: 412,
    },
    Seed {
        id: "SPC-1709123456796-SFR620",
        name: "Kashmiri Saffron",
        price: 2499,
        original_price: Some(2999),
        category: "spices",
        image: "/images/products/saffron.jpg",
        description: "Grade A mongra saffron threads, hand-picked in Pampore.",
        weight: "100g",
        nutritional_info: "Manganese 28mg, Vitamin C 81mg per 100g",
        in_stock: true,
        featured: true,
        rating: 4.9,
        reviews: 233,
    },
    Seed {
        id: "SPC-1709123456797-BPP144",
        name: "Tellicherry Black Pepper",
        price: 349,
        original_price: None,
        category: "spices",
        image: "/images/products/black-pepper.jpg",
        description: "Extra bold Malabar peppercorns with a sharp, citrusy bite.",
        weight: "250g",
        nutritional_info: "Fibre 25g, Iron 9.7mg per 100g",
        in_stock: true,
        featured: false,
        rating: 4.6,
        reviews: 178,
    },
    Seed {
        id: "SPC-1709123456798-CNM885",
        name: "Ceylon Cinnamon Sticks",
        price: 299,
        original_price: Some(349),
        category: "spices",
        image: "/images/products/cinnamon.jpg",
        description: "Thin, papery quills of true cinnamon with a delicate sweetness.",
        weight: "100g",
        nutritional_info: "Fibre 53g, Calcium 1002mg per 100g",
        in_stock: true,
        featured: false,
        rating: 4.5,
        reviews: 129,
    },
    Seed {
        id: "SPC-1709123456799-CLV372",
        name: "Whole Cloves",
        price: 279,
        original_price: None,
        category: "spices",
        image: "/images/products/cloves.jpg",
        description: "Oil-rich cloves from Kerala, sun dried in small batches.",
        weight: "100g",
        nutritional_info: "Fibre 34g, Manganese 60mg per 100g",
        in_stock: true,
        featured: false,
        rating: 4.4,
        reviews: 94,
    },
    Seed {
        id: "SPC-1709123456800-TRM209",
        name: "Lakadong Turmeric Powder",
        price: 399,
        original_price: Some(449),
        category: "spices",
        image: "/images/products/turmeric.jpg",
        description: "High-curcumin turmeric from Meghalaya, stone ground.",
        weight: "500g",
        nutritional_info: "Curcumin 7-9%, Iron 41mg per 100g",
        in_stock: true,
        featured: false,
        rating: 4.7,
        reviews: 201,
    },
    Seed {
        id: "DRF-1709123456801-DTS558",
        name: "Medjool Dates",
        price: 999,
        original_price: Some(1199),
        category: "dry-fruits",
        image: "/images/products/medjool-dates.jpg",
        description: "Soft, jumbo Medjool dates with a caramel-like flavour.",
        weight: "500g",
        nutritional_info: "Carbohydrate 75g, Fibre 7g, Potassium 696mg per 100g",
        in_stock: true,
        featured: true,
        rating: 4.8,
        reviews: 267,
    },
    Seed {
        id: "DRF-1709123456802-APR616",
        name: "Turkish Apricots",
        price: 549,
        original_price: None,
        category: "dry-fruits",
        image: "/images/products/apricots.jpg",
        description: "Sun-dried whole apricots, plump and naturally tangy.",
        weight: "250g",
        nutritional_info: "Fibre 7g, Vitamin A 3604 IU per 100g",
        in_stock: true,
        featured: false,
        rating: 4.4,
        reviews: 112,
    },
    Seed {
        id: "DRF-1709123456803-FIG430",
        name: "Afghan Dried Figs",
        price: 849,
        original_price: Some(949),
        category: "dry-fruits",
        image: "/images/products/dried-figs.jpg",
        description: "Tender dried figs (anjeer) with a honeyed, seedy crunch.",
        weight: "250g",
        nutritional_info: "Fibre 10g, Calcium 162mg per 100g",
        in_stock: true,
        featured: false,
        rating: 4.5,
        reviews: 143,
    },
    Seed {
        id: "DRF-1709123456804-RSN997",
        name: "Golden Raisins",
        price: 299,
        original_price: None,
        category: "dry-fruits",
        image: "/images/products/golden-raisins.jpg",
        description: "Seedless golden raisins from Nashik vineyards.",
        weight: "500g",
        nutritional_info: "Carbohydrate 79g, Iron 1.9mg per 100g",
        in_stock: true,
        featured: false,
        rating: 4.3,
        reviews: 88,
    },
    Seed {
        id: "DRF-1709123456805-CRN761",
        name: "Dried Cranberries",
        price: 459,
        original_price: Some(499),
        category: "dry-fruits",
        image: "/images/products/cranberries.jpg",
        description: "Lightly sweetened, sliced cranberries for snacking and baking.",
        weight: "250g",
        nutritional_info: "Fibre 5g, Vitamin E 2.1mg per 100g",
        in_stock: true,
        featured: false,
        rating: 4.2,
        reviews: 67,
    },
    Seed {
        id: "DRF-1709123456806-MIX142",
        name: "Royal Dry Fruit Mix",
        price: 1599,
        original_price: Some(1899),
        category: "dry-fruits",
        image: "/images/products/royal-mix.jpg",
        description: "Almonds, cashews, pistachios, raisins and apricots in one jar.",
        weight: "1kg",
        nutritional_info: "Protein 15g, Fibre 8g per 100g",
        in_stock: true,
        featured: true,
        rating: 4.7,
        reviews: 305,
    },
];

static PRODUCTS: LazyLock<Vec<Product>> = LazyLock::new(|| {
    SEED.iter()
        .map(|s| Product {
            id: s.id.to_string(),
            name: s.name.to_string(),
            price: Money::from_rupees(s.price),
            original_price: s.original_price.map(Money::from_rupees),
            category: s.category.to_string(),
            image: s.image.to_string(),
            description: s.description.to_string(),
            weight: s.weight.to_string(),
            nutritional_info: s.nutritional_info.to_string(),
            in_stock: s.in_stock,
            featured: s.featured,
            rating: s.rating,
            reviews: s.reviews,
        })
        .collect()
});

/// All products in catalog order.
pub fn products() -> &'static [Product] {
    &PRODUCTS
}

pub fn find_product(id: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.id == id)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product_id::{is_valid_product_id, product_prefix};
    use std::collections::HashSet;

    #[test]
    fn test_every_id_is_well_formed_and_unique() {
        let mut seen = HashSet::new();
        for product in products() {
            assert!(is_valid_product_id(&product.id), "bad id {}", product.id);
            assert!(seen.insert(product.id.clone()), "duplicate id {}", product.id);
        }
    }

    #[test]
    fn test_prefix_matches_category() {
        for product in products() {
            let category = find_category(&product.category).expect("known category");
            assert_eq!(product_prefix(&product.id), Some(category.prefix.as_str()));
        }
    }

    #[test]
    fn test_discounts_only_where_cheaper() {
        for product in products() {
            if let Some(original) = product.original_price {
                assert!(original > product.price, "{}", product.name);
                assert!(product.discount_percent().is_some());
            }
        }
    }

    #[test]
    fn test_lookup() {
        let almonds = find_product("NUT-1709123456789-ABC123").unwrap();
        assert_eq!(almonds.name, "California Almonds");
        assert_eq!(almonds.price, Money::from_rupees(899));
        assert!(find_product("NUT-0-XXXXXX").is_none());
        assert!(find_category("grains").is_none());
    }
}
