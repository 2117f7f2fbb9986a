//! Database seeder for Tally development and testing.
//!
//! Seeds the currency table and a demo group with an admin and two members
//! for local development.
//!
//! Usage: cargo run --bin seeder

use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;

use tally_core::auth::hash_password;
use tally_db::entities::users;
use tally_db::repositories::user::UserChanges;
use tally_db::{CurrencyRepository, GroupRepository, UserRepository};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = tally_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding currencies...");
    seed_currencies(&db).await;

    println!("Seeding demo group...");
    seed_demo_group(&db).await;

    println!("Seeding complete!");
}

/// Seeds the base currencies. EUR is the base and always has rate 1.
async fn seed_currencies(db: &DatabaseConnection) {
    let repo = CurrencyRepository::new(db.clone());

    let currencies = [
        ("EUR", dec!(1)),
        ("USD", dec!(1.08)),
        ("GBP", dec!(0.86)),
        ("CHF", dec!(0.94)),
        ("SEK", dec!(11.32)),
    ];

    for (code, rate) in currencies {
        match repo.create(code, rate).await {
            Ok(_) => println!("  Created currency {code}"),
            Err(_) => println!("  Currency {code} already exists, skipping..."),
        }
    }
}

/// Seeds a demo group with an admin and two members who report to them.
async fn seed_demo_group(db: &DatabaseConnection) {
    let users_repo = UserRepository::new(db.clone());
    let groups_repo = GroupRepository::new(db.clone());

    let admin = seed_user(&users_repo, "admin@tally.dev").await;
    let Some(admin) = admin else {
        println!("  Demo users already exist, skipping...");
        return;
    };
    let alice = seed_user(&users_repo, "alice@tally.dev")
        .await
        .expect("Failed to seed user");
    let bob = seed_user(&users_repo, "bob@tally.dev")
        .await
        .expect("Failed to seed user");

    let group = groups_repo
        .create_with_admin("Demo Group", &admin)
        .await
        .expect("Failed to create demo group");
    groups_repo
        .join(&group.invite_code, &alice)
        .await
        .expect("Failed to join demo group");
    groups_repo
        .join(&group.invite_code, &bob)
        .await
        .expect("Failed to join demo group");

    // Reload the admin with their membership before running updates
    let admin = users_repo
        .find_by_id(admin.id)
        .await
        .expect("Failed to reload admin")
        .expect("Admin should exist");

    // Members report to the admin
    for member in [&alice, &bob] {
        users_repo
            .update_user(
                &admin,
                member.id,
                UserChanges {
                    approvers: Some(vec![admin.id]),
                    ..UserChanges::default()
                },
            )
            .await
            .expect("Failed to assign approver");
    }

    println!("  Created demo group {} (invite code {})", group.id, group.invite_code);
}

/// Seeds one user, returning None if the email is already taken.
async fn seed_user(repo: &UserRepository, email: &str) -> Option<users::Model> {
    if repo
        .email_exists(email)
        .await
        .expect("Failed to check email")
    {
        return None;
    }

    let hash = hash_password("password123").expect("Failed to hash password");
    let user = repo
        .create(email, &hash, "EUR")
        .await
        .expect("Failed to create user");
    println!("  Created user {email}");

    Some(user)
}
