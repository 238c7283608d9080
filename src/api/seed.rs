//! First-run data seeding.
//!
//! Each seeding step runs only when its table is empty, so an existing
//! database is never touched. The admin account is seeded only when
//! credentials were supplied on the command line; the starter campaigns and
//! catalog ship with the binary.

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tracing::{info, warn, Instrument};

use super::handlers::auth::password;

/// Credentials for the first-run admin account.
pub struct SeedAdmin {
    pub email: String,
    pub password: SecretString,
}

struct SeedCampaign {
    title: &'static str,
    description: &'static str,
    collected_amount: f64,
    goal_amount: f64,
    supporters: i64,
    image: &'static str,
    is_urgent: bool,
}

const INITIAL_CAMPAIGNS: [SeedCampaign; 3] = [
    SeedCampaign {
        title: "Emergency Support for Weaver Families",
        description: "Help provide immediate assistance to weaver families affected by recent natural disasters in the region.",
        collected_amount: 125_000.0,
        goal_amount: 200_000.0,
        supporters: 89,
        image: "https://www.lakwatsero.com/wp-content/uploads/2021/11/Cordillera-Weaves-06.jpg",
        is_urgent: true,
    },
    SeedCampaign {
        title: "Traditional Loom Restoration Project",
        description: "Restore and maintain traditional looms to ensure the continuation of authentic weaving techniques.",
        collected_amount: 85_000.0,
        goal_amount: 150_000.0,
        supporters: 67,
        image: "https://www.textileschool.com/wp-content/uploads/2025/03/traditional-weavers-working-on-handlooms-in-a-rural-setting.jpg",
        is_urgent: false,
    },
    SeedCampaign {
        title: "Youth Weaving Education Program",
        description: "Fund educational programs to teach traditional weaving skills to the next generation of artisans.",
        collected_amount: 45_000.0,
        goal_amount: 100_000.0,
        supporters: 34,
        image: "https://www.sapiens.org/app/uploads/2020/08/06_Paulette.Crespillo-Cuison_compressed.jpg",
        is_urgent: false,
    },
];

struct SeedProduct {
    name: &'static str,
    price: f64,
    description: &'static str,
    image: &'static str,
}

const INITIAL_PRODUCTS: [SeedProduct; 4] = [
    SeedProduct {
        name: "Cordillera Wall Hanging",
        price: 595.00,
        description: "Handwoven Wall Decor handmade by our Baguio Locals.",
        image: "https://files.catbox.moe/yaap40.jpg",
    },
    SeedProduct {
        name: "Inabel Super Brocade Twin Blanket",
        price: 8107.81,
        description: "Inabel, sometimes referred to as Abel Iloco or simply Abel, is a weaving tradition native to the Ilocano people of Northern Luzon in the Philippines. The textile it produces is sought after in the fashion and interior design industries due to its softness, durability, suitability in tropical climates, and for its austere design patterns.",
        image: "https://files.catbox.moe/wnw7it.webp",
    },
    SeedProduct {
        name: "Ikat Weave on Bamboo Table Runner - Red",
        price: 2313.62,
        description: "These ikat weave bamboo table runners were handcrafted by independent Balinese artisans. Ikat dyeing is a traditional technique that has been passed down through generations. Add these trendy runners to your table for a pop of colour. (Specifications: Handcrafted in Bali, Cotton weave on bamboo, 180 CM L)",
        image: "https://files.catbox.moe/hvwfrc.webp",
    },
    SeedProduct {
        name: "VMWI1 - Kalinga Infinity Scarf",
        price: 3600.0,
        description: "From Makabayan Wear, this is a more modern scarf design using traditional fabric hand woven by the renowned indigenous weavers of kalinga, Philipipnes",
        image: "https://files.catbox.moe/wnfxbd.png",
    },
];

/// Run all first-run seeding steps.
///
/// # Errors
/// Returns an error if a seeding query fails.
pub(crate) async fn run(pool: &PgPool, admin: Option<&SeedAdmin>) -> Result<()> {
    seed_admin(pool, admin).await?;
    seed_campaigns(pool).await?;
    seed_products(pool).await?;
    Ok(())
}

async fn table_is_empty(pool: &PgPool, table: &str) -> Result<bool> {
    // Table names come from the callers below, never from input.
    let query = format!("SELECT 1 FROM {table} LIMIT 1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .with_context(|| format!("failed to probe table {table}"))?;
    Ok(row.is_none())
}

async fn seed_admin(pool: &PgPool, admin: Option<&SeedAdmin>) -> Result<()> {
    if !table_is_empty(pool, "users").await? {
        return Ok(());
    }

    let Some(admin) = admin else {
        warn!("No users exist and no seed admin is configured; admin endpoints stay unreachable");
        return Ok(());
    };

    let hashed_password = password::hash(admin.password.expose_secret())
        .context("failed to hash seed admin password")?;

    let query = r"
        INSERT INTO users (email, name, address, is_admin, hashed_password)
        VALUES ($1, $2, $3, TRUE, $4)
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(&admin.email)
        .bind("Admin User")
        .bind("Cordillera HQ")
        .bind(hashed_password)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to insert seed admin")?;

    info!("Initial admin created");
    Ok(())
}

async fn seed_campaigns(pool: &PgPool) -> Result<()> {
    if !table_is_empty(pool, "campaigns").await? {
        return Ok(());
    }

    let query = r"
        INSERT INTO campaigns
            (title, description, goal_amount, collected_amount, supporters, image, is_urgent)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
    ";
    for campaign in &INITIAL_CAMPAIGNS {
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(campaign.title)
            .bind(campaign.description)
            .bind(campaign.goal_amount)
            .bind(campaign.collected_amount)
            .bind(campaign.supporters)
            .bind(campaign.image)
            .bind(campaign.is_urgent)
            .execute(pool)
            .instrument(span)
            .await
            .with_context(|| format!("failed to insert seed campaign {}", campaign.title))?;
    }

    info!(count = INITIAL_CAMPAIGNS.len(), "Initial campaigns created");
    Ok(())
}

async fn seed_products(pool: &PgPool) -> Result<()> {
    if !table_is_empty(pool, "products").await? {
        return Ok(());
    }

    let query = r"
        INSERT INTO products (name, price, description, image)
        VALUES ($1, $2, $3, $4)
    ";
    for product in &INITIAL_PRODUCTS {
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(product.name)
            .bind(product.price)
            .bind(product.description)
            .bind(product.image)
            .execute(pool)
            .instrument(span)
            .await
            .with_context(|| format!("failed to insert seed product {}", product.name))?;
    }

    info!(count = INITIAL_PRODUCTS.len(), "Initial products created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{INITIAL_CAMPAIGNS, INITIAL_PRODUCTS};

    #[test]
    fn seed_campaigns_are_consistent() {
        for campaign in &INITIAL_CAMPAIGNS {
            assert!(!campaign.title.is_empty());
            assert!(campaign.goal_amount > 0.0);
            assert!(campaign.collected_amount <= campaign.goal_amount);
            assert!(campaign.supporters >= 0);
        }
        assert_eq!(
            INITIAL_CAMPAIGNS
                .iter()
                .filter(|campaign| campaign.is_urgent)
                .count(),
            1
        );
    }

    #[test]
    fn seed_products_have_positive_prices() {
        for product in &INITIAL_PRODUCTS {
            assert!(!product.name.is_empty());
            assert!(product.price > 0.0);
            assert!(product.image.starts_with("https://"));
        }
    }
}
