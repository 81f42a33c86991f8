use clap::{Parser, Subcommand};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "funnel")]
#[command(about = "Fast CRM pipeline tracking from the command line", long_about = None)]
#[command(version, long_version = LONG_VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List contacts
    #[command(alias = "ls")]
    List {
        /// Free-text search across name, email, company and title
        #[arg(short, long)]
        search: Option<String>,

        /// Only contacts at this stage (lead, prospect, customer, partner)
        #[arg(long)]
        stage: Option<String>,

        /// Only contacts at this company (exact match)
        #[arg(long)]
        company: Option<String>,

        /// Only contacts owned by this user (exact match)
        #[arg(long)]
        owner: Option<String>,

        /// Only contacts carrying any of these tags
        #[arg(short, long)]
        tag: Vec<String>,

        /// Show archived contacts instead of active ones
        #[arg(long)]
        inactive: bool,

        /// Show both active and archived contacts
        #[arg(long)]
        all: bool,

        /// Only contacts created within (today, week, month, quarter)
        #[arg(long)]
        since: Option<String>,

        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Search contacts, best match first
    Search { term: String },

    /// Add a contact
    #[command(alias = "add")]
    AddContact {
        first_name: String,

        #[arg(required = false, default_value = "")]
        last_name: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        company: Option<String>,

        /// Job title
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        owner: Option<String>,

        #[arg(short, long)]
        tag: Vec<String>,
    },

    /// Edit a contact (only the given fields change)
    EditContact {
        id: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        owner: Option<String>,

        #[arg(long)]
        stage: Option<String>,

        #[arg(short, long)]
        tag: Vec<String>,
    },

    /// Archive contacts (soft delete)
    Archive {
        /// Contact ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Restore archived contacts
    Restore {
        /// Contact ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Apply a named bulk action (archive, stage-<stage>, export)
    Bulk {
        action: String,

        /// Contact ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// List deals
    Deals {
        #[arg(short, long)]
        search: Option<String>,

        /// Only deals at this stage (qualification, proposal, negotiation,
        /// closed-won, closed-lost)
        #[arg(long)]
        stage: Option<String>,

        #[arg(long)]
        owner: Option<String>,

        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Add a deal
    AddDeal {
        name: String,

        /// Deal amount
        amount: f64,

        /// Win probability, 0-100
        probability: u8,

        #[arg(long)]
        account: Option<String>,

        #[arg(long)]
        owner: Option<String>,

        #[arg(long)]
        stage: Option<String>,

        /// Expected close date (YYYY-MM-DD)
        #[arg(long)]
        close: Option<String>,
    },

    /// Edit a deal (only the given fields change)
    EditDeal {
        id: String,

        #[arg(long)]
        amount: Option<f64>,

        #[arg(long)]
        probability: Option<u8>,

        #[arg(long)]
        stage: Option<String>,

        #[arg(long)]
        owner: Option<String>,

        /// Expected close date (YYYY-MM-DD)
        #[arg(long)]
        close: Option<String>,

        /// Why the deal was lost (required with --stage closed-lost)
        #[arg(long)]
        reason: Option<String>,
    },

    /// Remove deals permanently
    RemoveDeal {
        /// Deal ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Pipeline summary, owner leaderboard and closing deals
    #[command(alias = "stats")]
    Forecast {
        /// Close-date window: month, quarter or year
        #[arg(long)]
        period: Option<String>,

        /// Limit to one owner's deals
        #[arg(long)]
        owner: Option<String>,
    },

    /// List job grades
    Grades {
        /// Include retired grades
        #[arg(long)]
        all: bool,

        #[arg(short, long)]
        search: Option<String>,

        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Add a job grade
    AddGrade {
        /// Unique grade key (e.g. e3)
        key: String,

        title: String,

        #[arg(long, default_value_t = 0)]
        level: u8,

        /// Salary band minimum
        #[arg(long)]
        min: Option<f64>,

        /// Salary band maximum
        #[arg(long)]
        max: Option<f64>,
    },

    /// Export active records to a tar.gz archive
    Export,

    /// Get or set configuration
    Config {
        /// Configuration key (e.g., page-size, default-owner)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}
