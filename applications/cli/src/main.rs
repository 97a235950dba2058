/// FinTrack - personal finance from the terminal
use anyhow::{anyhow, bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use fintrack_client::{
    handle_api_error, load_active_budgets, routes, select_backend, ApiClient, AuthSession,
    BudgetService, CategoriesStore, CategoryService, ClientConfig, ClientError,
    FileSessionStore, PersistedSession, RouteHistory, TransactionService, TransactionsStore,
    MOCK_EMAIL, MOCK_PASSWORD,
};
use fintrack_core::analytics::{
    average_monthly_expense, current_month_budget_usage, monthly_breakdown, recent_transactions,
    spending_by_category, summarize,
};
use fintrack_core::budget::{calculate_budget_progress, days_remaining_in_period};
use fintrack_core::format::format_currency;
use fintrack_core::{
    CategoryId, LoginForm, RegisterForm, Transaction, TransactionFilters, TransactionForm,
    TransactionId, TransactionType, User,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Transactions shown on the dashboard summary
const DASHBOARD_RECENT: usize = 5;
/// Months shown in the summary breakdown
const SUMMARY_MONTHS: usize = 6;

#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "FinTrack personal finance client", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./fintrack.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "FINTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "FINTRACK_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        display_name: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Manage transactions
    Transactions {
        #[command(subcommand)]
        action: TransactionAction,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Inspect budgets
    Budgets {
        #[command(subcommand)]
        action: BudgetAction,
    },
    /// Dashboard summary
    Summary,
    /// Check whether the API is up
    Health,
    /// Toggle the development mock backend
    Fallback {
        #[command(subcommand)]
        action: FallbackAction,
    },
}

#[derive(Subcommand)]
enum TransactionAction {
    /// List transactions, newest first
    List {
        /// income or expense
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionType>,
        #[arg(short, long)]
        category: Option<String>,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Record a transaction
    Add {
        #[arg(short, long)]
        amount: f64,
        #[arg(short, long)]
        description: String,
        #[arg(short, long)]
        category: String,
        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionType,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete a transaction
    Delete { id: String },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories
    List,
    /// Delete a category (at least three must remain)
    Delete { id: String },
}

#[derive(Subcommand)]
enum BudgetAction {
    /// List all budgets
    List,
    /// Progress of the active budgets
    Progress,
}

#[derive(Subcommand)]
enum FallbackAction {
    Enable,
    Disable,
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fintrack=info,fintrack_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config =
        ClientConfig::load_from(cli.config.as_deref()).context("Failed to load configuration")?;

    let route = match &cli.command {
        Commands::Login { .. } => routes::LOGIN,
        Commands::Signup { .. } => routes::SIGNUP,
        Commands::Transactions { .. } => routes::TRANSACTIONS,
        Commands::Categories { .. } | Commands::Budgets { .. } => routes::SETTINGS,
        Commands::Summary => routes::ANALYTICS,
        _ => routes::DASHBOARD,
    };
    let app = App::open(config, route).await?;

    match cli.command {
        Commands::Login { email, password } => app.login(LoginForm::new(email, password)).await,
        Commands::Signup {
            email,
            password,
            username,
            display_name,
        } => {
            app.signup(RegisterForm {
                email,
                password,
                username,
                display_name,
            })
            .await
        }
        Commands::Logout => app.logout().await,
        Commands::Whoami => app.whoami().await,
        Commands::Transactions { action } => app.transactions(action).await,
        Commands::Categories { action } => app.categories(action).await,
        Commands::Budgets { action } => app.budgets(action).await,
        Commands::Summary => app.summary().await,
        Commands::Health => app.health().await,
        Commands::Fallback { action } => app.fallback(action).await,
    }
}

fn friendly(error: &ClientError) -> anyhow::Error {
    anyhow!(handle_api_error(error))
}

struct App {
    config: ClientConfig,
    session: PersistedSession,
    navigator: Arc<RouteHistory>,
    api: ApiClient,
}

impl App {
    async fn open(config: ClientConfig, route: &str) -> anyhow::Result<Self> {
        let store = FileSessionStore::open(&config.session_file).await?;
        let session = PersistedSession::new(Arc::new(store));
        let navigator = Arc::new(RouteHistory::new(route));
        let api = ApiClient::new(&config, session.clone(), navigator.clone())?;

        tracing::debug!(base_url = api.base_url(), environment = ?config.environment, "Client ready");

        Ok(Self {
            config,
            session,
            navigator,
            api,
        })
    }

    async fn auth(&self) -> AuthSession {
        let backend = select_backend(&self.config, &self.api, self.session.clone()).await;
        AuthSession::new(backend, self.session.clone(), self.navigator.clone())
    }

    /// Restore the stored session or fail with a hint
    async fn require_user(&self) -> anyhow::Result<User> {
        let mut auth = self.auth().await;
        auth.initialize().await;
        match auth.user() {
            Some(user) => Ok(user.clone()),
            None => bail!("Not signed in. Run `fintrack login` first."),
        }
    }

    async fn login(&self, form: LoginForm) -> anyhow::Result<()> {
        let mut auth = self.auth().await;
        auth.initialize().await;
        auth.login(&form).await.map_err(|e| friendly(&e))?;
        if let Some(user) = auth.user() {
            println!("Signed in as {} <{}>", user.label(), user.email);
        }
        if self.session.fallback_enabled().await && !self.config.is_production() {
            println!("(development mock active; credentials {MOCK_EMAIL} / {MOCK_PASSWORD})");
        }
        Ok(())
    }

    async fn signup(&self, form: RegisterForm) -> anyhow::Result<()> {
        let mut auth = self.auth().await;
        auth.initialize().await;
        auth.signup(&form).await.map_err(|e| friendly(&e))?;
        if let Some(user) = auth.user() {
            println!("Account created for {} <{}>", user.label(), user.email);
        }
        Ok(())
    }

    async fn logout(&self) -> anyhow::Result<()> {
        let mut auth = self.auth().await;
        auth.logout().await;
        println!("Signed out");
        Ok(())
    }

    async fn whoami(&self) -> anyhow::Result<()> {
        let user = self.require_user().await?;
        println!("{}", user.label());
        println!("  email:    {}", user.email);
        println!("  username: {}", user.username);
        println!("  id:       {}", user.id);
        Ok(())
    }

    async fn transactions(&self, action: TransactionAction) -> anyhow::Result<()> {
        self.require_user().await?;
        let service = TransactionService::new(self.api.clone());

        match action {
            TransactionAction::List {
                kind,
                category,
                from,
                to,
                limit,
            } => {
                let filters = TransactionFilters {
                    kind,
                    category_id: category.map(CategoryId::new),
                    start_date: from,
                    end_date: to,
                    limit,
                };
                let mut store = TransactionsStore::with_query(service, filters.clone());
                store.fetch().await;
                if let Some(error) = store.error() {
                    bail!("{error}");
                }
                // The server may ignore some filters; apply them locally as well
                print_transactions(&filters.apply(store.items()));
            }
            TransactionAction::Add {
                amount,
                description,
                category,
                kind,
                date,
            } => {
                let form = TransactionForm {
                    category_id: CategoryId::new(category),
                    amount,
                    description,
                    kind,
                    transaction_date: date.unwrap_or_else(|| Local::now().date_naive()),
                };
                let created = service.create(&form).await.map_err(|e| friendly(&e))?;
                println!("Created transaction {}", created.id);
                print_transactions(&[created]);
            }
            TransactionAction::Delete { id } => {
                service
                    .delete(&TransactionId::new(id.as_str()))
                    .await
                    .map_err(|e| friendly(&e))?;
                println!("Deleted transaction {id}");
            }
        }
        Ok(())
    }

    async fn categories(&self, action: CategoryAction) -> anyhow::Result<()> {
        self.require_user().await?;
        let mut store = CategoriesStore::new(CategoryService::new(self.api.clone()));
        store.fetch().await;
        if let Some(error) = store.error() {
            bail!("{error}");
        }

        match action {
            CategoryAction::List => {
                for c in store.items() {
                    println!("{:<24} {:<20} {:<10} {}", c.id, c.name, c.color, c.icon);
                }
                println!("{} categories", store.items().len());
            }
            CategoryAction::Delete { id } => {
                let id = CategoryId::new(id);
                if !store.api().can_delete(&id).await {
                    bail!("Category {id} is still in use");
                }
                if !store.delete_keeping_minimum(&id).await {
                    bail!("{}", store.error().unwrap_or("Error al eliminar categoría"));
                }
                println!("Deleted category {id}; {} remain", store.items().len());
            }
        }
        Ok(())
    }

    async fn budgets(&self, action: BudgetAction) -> anyhow::Result<()> {
        self.require_user().await?;
        let service = BudgetService::new(self.api.clone());
        let today = Local::now().date_naive();

        match action {
            BudgetAction::List => {
                let budgets = service.list().await.map_err(|e| friendly(&e))?;
                for b in &budgets {
                    let end = b.end_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
                    println!(
                        "{:<24} {:<16} {:>12} {:<8} {} .. {}",
                        b.id,
                        b.category_id,
                        format_currency(b.amount),
                        b.period,
                        b.start_date,
                        end
                    );
                }
                println!("{} budgets", budgets.len());
            }
            BudgetAction::Progress => {
                let active = load_active_budgets(&service).await;
                if let Some(error) = active.error() {
                    bail!("{error}");
                }
                for budget in active.value().map(Vec::as_slice).unwrap_or_default() {
                    match service.analysis(&budget.id).await {
                        Ok(analysis) => {
                            let progress = calculate_budget_progress(budget.amount, analysis.spent);
                            println!(
                                "{:<16} {:>12} of {:>12}  {:>5.1}%  {:<7}  {} days left",
                                budget.category_id,
                                format_currency(analysis.spent),
                                format_currency(budget.amount),
                                progress.percentage,
                                progress.status,
                                days_remaining_in_period(budget, today)
                            );
                        }
                        Err(e) => println!("{:<16} {}", budget.category_id, handle_api_error(&e)),
                    }
                }
            }
        }
        Ok(())
    }

    async fn summary(&self) -> anyhow::Result<()> {
        let user = self.require_user().await?;
        let transactions = TransactionService::new(self.api.clone())
            .list(&TransactionFilters::default())
            .await
            .map_err(|e| friendly(&e))?;
        let categories = CategoryService::new(self.api.clone())
            .list()
            .await
            .map_err(|e| friendly(&e))?;
        let today = Local::now().date_naive();

        let totals = summarize(&transactions);
        println!("Summary for {}", user.label());
        println!("  income:   {:>14}", format_currency(totals.total_income));
        println!("  expenses: {:>14}", format_currency(totals.total_expenses));
        println!("  balance:  {:>14}", format_currency(totals.net_balance));
        println!(
            "  average monthly expense: {}",
            format_currency(average_monthly_expense(&transactions))
        );
        println!(
            "  this month: {}% of budget used",
            current_month_budget_usage(&transactions, today)
        );

        println!("\nRecent");
        print_transactions(&recent_transactions(&transactions, DASHBOARD_RECENT));

        println!("\nMonthly");
        for month in monthly_breakdown(&transactions, SUMMARY_MONTHS) {
            println!(
                "  {}  +{:>12}  -{:>12}  = {:>12}",
                month.key(),
                format_currency(month.income),
                format_currency(month.expenses),
                format_currency(month.net())
            );
        }

        println!("\nSpending by category");
        for entry in spending_by_category(&transactions, &categories) {
            println!("  {:<24} {:>12}", entry.name, format_currency(entry.value));
        }
        Ok(())
    }

    async fn health(&self) -> anyhow::Result<()> {
        if self.api.health().await {
            println!("{} is up", self.api.base_url());
            Ok(())
        } else {
            bail!("{} is not responding", self.api.base_url())
        }
    }

    async fn fallback(&self, action: FallbackAction) -> anyhow::Result<()> {
        match action {
            FallbackAction::Enable => {
                if self.config.is_production() {
                    bail!("The development mock is not available in production");
                }
                self.session.set_fallback_enabled(true).await?;
                println!("Development mock enabled. Sign in with {MOCK_EMAIL} / {MOCK_PASSWORD}");
            }
            FallbackAction::Disable => {
                self.session.set_fallback_enabled(false).await?;
                println!("Development mock disabled");
            }
            FallbackAction::Status => {
                let state = if self.session.fallback_enabled().await {
                    "enabled"
                } else {
                    "disabled"
                };
                println!("Development mock {state}");
            }
        }
        Ok(())
    }
}

fn print_transactions(transactions: &[Transaction]) {
    for t in transactions {
        let category = t
            .category
            .as_ref()
            .map_or(t.category_id.as_str(), |c| c.name.as_str());
        println!(
            "  {}  {:>12}  {:<20}  {}  [{}]",
            t.transaction_date,
            format_currency(t.signed_amount()),
            category,
            t.description,
            t.id
        );
    }
}
