//! API Insights - Actor-based API explorer
//!
//! Architecture:
//! - UI Layer - line REPL on stdin, plain-text rendering on stdout
//! - App Layer - central state machine processing events
//! - Network Layer (Tokio) - async query execution

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use api_insights::constants::{APP_NAME, APP_VERSION, LOG_FILE};
use api_insights::messages::{parse_command, ResultView};
use api_insights::network::create_client;
use api_insights::reports::FinancialReport;
use api_insights::{
    AppActor, AppState, DirectorySink, Explorer, FileConnectionStore, NetworkActor, NetworkCommand,
    NetworkResponse, RenderState, ReqwestFetcher, Settings, UiEvent,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let settings = Settings::load()?;
    tracing::info!(export_dir = %settings.export_dir.display(), model = %settings.gemini_model, "Settings loaded");

    // Collaborators
    let client = create_client();
    let explorer = Arc::new(Explorer::new(
        Arc::new(ReqwestFetcher::new(client.clone())),
        settings.name_suggester(client),
    ));
    let state = AppState::new(
        Box::new(FileConnectionStore::open_default()),
        Box::new(DirectorySink::new(settings.export_dir.clone())),
    );

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(explorer, net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(state, net_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    println!("{} v{}", APP_NAME, APP_VERSION);
    run_ui_loop(ui_tx, &mut render_rx).await?;

    Ok(())
}

/// Read commands from stdin and print every state update
async fn run_ui_loop(
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    let _ = ui_tx.send(UiEvent::Quit);
                    break;
                };
                match parse_command(&line) {
                    Ok(Some(UiEvent::Quit)) => {
                        let _ = ui_tx.send(UiEvent::Quit);
                        break;
                    }
                    Ok(Some(event)) => {
                        let _ = ui_tx.send(event);
                    }
                    Ok(None) => {}
                    Err(usage) => println!("{}", usage),
                }
            }
            Some(state) = render_rx.recv() => draw_ui(&state),
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(state: &RenderState) {
    if state.show_help {
        draw_help();
    }

    draw_connections(state);
    draw_query(state);
    draw_result(&state.result);

    if state.show_columns {
        draw_column_manager(state);
    }
    if let Some(report) = &state.report {
        draw_report(report);
    }

    println!("> {}", state.status);
}

fn draw_connections(state: &RenderState) {
    if state.connections.is_empty() {
        println!("No connections. Use 'add' to create one.");
        return;
    }
    for conn in &state.connections {
        let marker = if state.active_connection_id.as_deref() == Some(conn.id.as_str()) { "*" } else { " " };
        println!(
            "{} {} {} [{} | {}] {}",
            marker,
            conn.id,
            conn.name,
            conn.api_type.as_str(),
            conn.auth.as_str(),
            conn.base_url
        );
    }
}

fn draw_query(state: &RenderState) {
    let query = &state.query;
    let loading = match (state.is_loading, state.is_report_loading) {
        (true, _) => " [...]",
        (false, true) => " [report...]",
        _ => "",
    };
    println!("{} {}{}", query.method, query.path, loading);
    for p in &query.params {
        println!("  ?{}={}", p.key, p.value);
    }
    for h in &query.headers {
        println!("  {}: {}", h.key, h.value);
    }
    if let Some(body) = &query.body {
        println!("  body: {}", body);
    }
}

fn draw_result(result: &ResultView) {
    match result {
        ResultView::Initial => {}
        ResultView::Loading => println!("Loading..."),
        ResultView::Error(error) => println!("ERROR: {}", error),
        ResultView::NoData => println!("No data."),
        ResultView::Scalar(text) => println!("{}", text),
        ResultView::Discovery(schema) => {
            println!("Namespace: {}", schema.namespace.as_deref().unwrap_or("-"));
            for route in &schema.routes {
                println!("  {:24} {}", route.methods.join(","), route.path);
            }
        }
        ResultView::Table { columns, rows } => draw_table(columns, rows),
    }
}

fn draw_table(columns: &[api_insights::Column], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.friendly_name.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:w$}", c.friendly_name, w = *w))
        .collect();
    println!("{}", header.join(" | "));
    println!("{}", widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));

    for row in rows {
        let cells: Vec<String> = row.iter().zip(&widths).map(|(cell, w)| format!("{:w$}", cell, w = *w)).collect();
        println!("{}", cells.join(" | "));
    }
}

fn draw_column_manager(state: &RenderState) {
    println!("Columns:");
    for column in &state.all_columns {
        let visible = if column.visible { "[x]" } else { "[ ]" };
        println!("  {} {:3} {} ({})", visible, column.order, column.friendly_name, column.key);
    }
}

fn draw_report(report: &FinancialReport) {
    println!("Gross revenue:  {:.2}", report.gross_revenue);
    println!("Total orders:   {}", report.total_orders);
    println!("Average ticket: {:.2}", report.average_ticket);
    println!("Top products:");
    for product in &report.top_selling_products {
        println!(
            "  {:>5} x {} ({:.2})",
            product.quantity, product.name, product.total_revenue
        );
    }
}

fn draw_help() {
    let help_text = r#"
 CONNECTIONS
   connections                         List saved connections
   add <name> <url> [generic|wordpress] [none|basic u p|bearer t|apikey h v|woo k s]
   use <id> / delete <id>              Select or remove a connection

 QUERY
   method <GET|POST|PUT|PATCH|DELETE>  Set the HTTP method
   path </endpoint>                    Set the path (or a full URL)
   param <key> <value>                 Add a query parameter
   header <name> <value>               Add a header
   body <json>                         Set the request body
   clear / run                         Reset or execute the query

 COLUMNS
   columns                             Toggle the column manager
   hide <key> / show <key>             Hide or show a column
   toggle <key>                        Flip a column's visibility
   rename <key> <name>                 Set the display name
   up <key> / down <key>               Move a column

 OUTPUT
   export <json|csv|pdf>               Export the visible columns
   report <start> <end> <status>       WooCommerce financial report

   help                                Toggle this help
   quit                                Exit
"#;
    println!("{}", help_text);
}
