use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "gsu-monitor",
    version,
    about = "terminal client for the GSU inventory and monitoring panel",
    long_about = "gsu-monitor talks to the GSU admin panel API: it lists inventory, manages borrowings and monitored areas, shows quick analytics and keeps a session clock.\n\nExamples:\n  gsu-monitor inventory --search marker\n  gsu-monitor borrowings create --borrower \"J. Cruz\" --item 2 --quantity 1 --due 2024-12-31\n  gsu-monitor areas list -o areas.html\n  gsu-monitor --base-url http://panel.local:5000 analytics --range 7d\n\nTip: Use init-config to write ~/.gsu-monitor/config.yml and keep invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase verbosity (-v logs requests, -vv adds bodies)."
    )]
    pub verbose: u8,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        global = true,
        help_heading = "Output",
        help = "Write the rendered page to a file."
    )]
    pub output: Option<String>,

    #[arg(
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        global = true,
        help_heading = "Output",
        help = "Output format: text, json or html (inferred from --output when omitted)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.gsu-monitor/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'b',
        long = "bu",
        visible_alias = "base-url",
        value_name = "URL",
        global = true,
        help_heading = "HTTP",
        help = "Admin panel server (default http://127.0.0.1:5000)."
    )]
    pub base_url: Option<String>,

    #[arg(
        short = 't',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        global = true,
        help_heading = "HTTP",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'x',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        global = true,
        help_heading = "HTTP",
        help = "Send requests through an HTTP proxy."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'H',
        long = "hd",
        visible_alias = "header",
        value_name = "'Key: Value'",
        global = true,
        help_heading = "HTTP",
        help = "Extra header sent with every request (e.g. a session cookie)."
    )]
    pub header: Option<String>,

    #[arg(
        long = "fr",
        visible_alias = "follow-redirects",
        num_args = 0..=1,
        default_missing_value = "true",
        global = true,
        help_heading = "HTTP",
        help = "Follow HTTP redirects (default true)."
    )]
    pub follow_redirects: Option<bool>,

    #[arg(
        short = 'y',
        long = "yes",
        visible_alias = "assume-yes",
        global = true,
        help_heading = "Behavior",
        help = "Answer yes to confirmation prompts."
    )]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the inventory table.
    #[command(visible_alias = "inv")]
    Inventory(InventoryArgs),

    /// List and manage borrowings.
    #[command(visible_alias = "borrow")]
    Borrowings {
        #[command(subcommand)]
        action: BorrowingCommand,
    },

    /// List and manage monitored areas.
    #[command(visible_alias = "monitoring")]
    Areas {
        #[command(subcommand)]
        action: AreaCommand,
    },

    /// Quick stats over inventory and borrowings.
    #[command(visible_alias = "graph")]
    Analytics(AnalyticsArgs),

    /// Session clock with a logout panel (Ctrl-C to log out).
    Session(SessionArgs),

    /// Write a commented default config file.
    InitConfig,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InventoryArgs {
    #[arg(short = 's', long = "search", value_name = "TERM", help = "Filter rows by name or id.")]
    pub search: Option<String>,

    #[arg(
        long = "add",
        value_name = "NAME,STOCK,ALERT[,UNIT]",
        action = ArgAction::Append,
        help = "Add an item to this view (not sent to the server). Repeatable."
    )]
    pub add: Vec<String>,

    #[arg(
        long = "delete",
        value_name = "ID",
        action = ArgAction::Append,
        help = "Remove an item from this view (not sent to the server). Repeatable."
    )]
    pub delete: Vec<u64>,

    #[arg(long = "offline", help = "Start from an empty list instead of fetching.")]
    pub offline: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum BorrowingCommand {
    /// Show the borrowing table.
    List {
        #[arg(short = 's', long = "search", value_name = "TERM")]
        search: Option<String>,
    },

    /// Create a borrow request.
    Create(BorrowArgs),

    /// Mark a borrowing as returned.
    Return {
        #[arg(value_name = "ID")]
        id: u64,
    },

    /// Delete a borrowing record.
    Delete {
        #[arg(value_name = "ID")]
        id: u64,
    },

    /// Show the item picker (inventory with available stock).
    Items,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BorrowArgs {
    #[arg(long = "borrower", value_name = "NAME")]
    pub borrower: Option<String>,

    #[arg(long = "item", value_name = "ITEM_ID")]
    pub item: Option<String>,

    #[arg(long = "quantity", visible_alias = "qty", value_name = "N")]
    pub quantity: Option<String>,

    #[arg(long = "due", visible_alias = "due-date", value_name = "YYYY-MM-DD")]
    pub due: Option<String>,

    #[arg(long = "purpose", value_name = "TEXT")]
    pub purpose: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AreaCommand {
    /// Show monitored areas.
    List {
        #[arg(short = 's', long = "search", value_name = "TERM")]
        search: Option<String>,
    },

    /// Add a monitored area.
    Add {
        #[arg(long = "name", value_name = "NAME")]
        name: Option<String>,

        #[arg(long = "building", value_name = "BUILDING")]
        building: Option<String>,
    },

    /// Delete a monitored area.
    Delete {
        #[arg(value_name = "ID")]
        id: u64,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyticsArgs {
    #[arg(
        short = 'r',
        long = "range",
        value_name = "RANGE",
        help = "Time range for most-used: 7d, 30d, 90d or all."
    )]
    pub range: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    #[arg(long = "landing-page", value_name = "PAGE", help = "Page to land on after logout.")]
    pub landing_page: Option<String>,

    #[arg(
        long = "for",
        value_name = "SECONDS",
        help = "Log out automatically after this many seconds."
    )]
    pub duration: Option<u64>,
}
