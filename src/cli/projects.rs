//! Projects command implementation

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

use crate::cli::CommandContext;
use crate::client::{CatalogApi, CatalogClient, Project};
use crate::error::Result;

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "SLUG")]
    slug: String,
    #[tabled(rename = "RUNS")]
    runs: usize,
}

impl From<&Project> for ProjectRow {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            slug: project.slug.clone(),
            runs: project.runs.len(),
        }
    }
}

/// Run the projects command: list the catalog as a table
pub async fn run(config_path: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(config_path).await?;
    let catalog = CatalogClient::new(ctx.session.clone());
    let projects = catalog.list_projects().await?;

    if projects.is_empty() {
        println!("No projects visible to this account.");
        return Ok(());
    }

    let rows: Vec<ProjectRow> = projects.iter().map(ProjectRow::from).collect();
    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    println!("{}", table);
    Ok(())
}
