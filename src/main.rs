use dotenvy::dotenv;
use keygate::router::init_router;
use keygate::state::init_app_state;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    // Maintenance command: there is no registration endpoint, so users are
    // provisioned from the command line.
    if args.len() > 1 && args[1] == "create-user" {
        handle_create_user(args).await;
        return;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format!(
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = init_app_state().await;
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    println!("🚀 Server running on http://localhost:3000");
    println!("📚 Swagger UI available at http://localhost:3000/swagger-ui");
    println!("📖 Scalar UI available at http://localhost:3000/scalar");
    axum::serve(listener, app).await.unwrap();
}

async fn handle_create_user(args: Vec<String>) {
    use keygate::modules::users::store::{PgUserStore, UserStore};
    use keygate::utils::password::hash_password;

    if args.len() != 6 {
        eprintln!(
            "Usage: {} create-user <first_name> <last_name> <email> <password>",
            args[0]
        );
        std::process::exit(1);
    }

    let first_name = &args[2];
    let last_name = &args[3];
    let email = &args[4];
    let password = &args[5];

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let hashed = match hash_password(password) {
        Ok(hashed) => hashed,
        Err(e) => {
            eprintln!("❌ Error hashing password: {}", e.error);
            std::process::exit(1);
        }
    };

    let store = PgUserStore::new(pool);
    match store.insert(first_name, last_name, email, &hashed).await {
        Ok(user) => {
            println!("✅ User created successfully!");
            println!("   Email: {}", user.email);
            println!("   Name: {} {}", user.first_name, user.last_name);
        }
        Err(e) => {
            eprintln!("❌ Error creating user: {}", e.error);
            std::process::exit(1);
        }
    }
}
