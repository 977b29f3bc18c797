//! Upload command implementation
//!
//! Drives the selection controller: resolve project, run, data type and
//! folder from flags or prompts, prepare the remote folders and credential,
//! then stream the copy tool's output until it exits.

use std::path::PathBuf;

use colored::Colorize;
use dialoguer::{Input, Select, theme::ColorfulTheme};

use crate::cli::{CommandContext, UploadArgs};
use crate::client::{
    CatalogApi, CatalogClient, DataType, Project, ToolsApi, ToolsClient,
};
use crate::error::{Error, Result};
use crate::transfer::{self, AzCopy, TransferEvent, TransferRequest};
use crate::upload::UploadController;

/// Run the upload command
pub async fn run(config_path: Option<&str>, args: UploadArgs) -> Result<()> {
    let ctx = CommandContext::new(config_path).await?;
    let catalog = CatalogClient::new(ctx.session.clone());
    let projects = catalog.list_projects().await?;

    if projects.is_empty() {
        println!("{}", "No projects visible to this account.".yellow());
        return Ok(());
    }

    let mut controller = UploadController::new();

    let project = pick_project(&projects, args.project)?;
    controller.set_project(Some(project.name.clone()));

    if project.runs.is_empty() {
        return Err(Error::Other(format!(
            "Project {} has no runs to upload data for.",
            project.name
        )));
    }
    let run_label = pick_run(project, args.run)?;
    controller.set_run(Some(run_label.clone()));

    let data_type = match args.data_type {
        Some(arg) => DataType::from(arg),
        None => prompt_data_type()?,
    };
    controller.set_data_type(Some(data_type));

    let folder = match args.folder {
        Some(folder) => folder,
        None => prompt_folder()?,
    };
    controller.set_folder(Some(folder.clone()));

    log::debug!("upload selection: {:?}", controller.selection());

    // Check the tool before touching anything remote
    let tool = AzCopy::locate(ctx.config.tool_path.as_deref())?;

    controller.begin()?;

    let tools = ToolsClient::new(ctx.session.clone(), ctx.config.tools.url.clone());

    println!("{}", "Preparing remote folders...".cyan());
    if let Err(err) = tools.init_folders(&project.name, &run_label).await {
        controller.fail();
        return Err(err);
    }

    let credential = match tools
        .get_upload_credential(&project.name, &run_label, data_type)
        .await
    {
        Ok(credential) => credential,
        Err(err) => {
            controller.fail();
            return Err(err);
        }
    };

    let request = TransferRequest {
        source_folder: folder,
        destination_url: credential.url,
        sas_token: credential.token,
    };

    println!(
        "Uploading {} ({}) to {}\n",
        request.source_folder.display(),
        data_type,
        request.masked_destination().cyan()
    );

    let mut events = match transfer::start(&tool, &request) {
        Ok(events) => events,
        Err(err) => {
            controller.fail();
            return Err(err);
        }
    };

    let mut exit_code = -1;
    while let Some(event) = events.recv().await {
        match event {
            TransferEvent::Line(line) => println!("{}", line),
            TransferEvent::Completed(code) => {
                controller.complete(code);
                exit_code = code;
            }
        }
    }

    if exit_code == 0 {
        println!("\n{}", "✓ Done.".green());
        Ok(())
    } else {
        Err(Error::Other(format!(
            "Transfer failed with exit code {}.",
            exit_code
        )))
    }
}

fn pick_project(projects: &[Project], requested: Option<String>) -> Result<&Project> {
    match requested {
        Some(name) => projects
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::Other(format!("Project not found: {}", name))),
        None => {
            let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
            let idx = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Project")
                .items(&names)
                .default(0)
                .interact()?;
            Ok(&projects[idx])
        }
    }
}

fn pick_run(project: &Project, requested: Option<String>) -> Result<String> {
    match requested {
        Some(label) => project
            .runs
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.label.clone())
            .ok_or_else(|| {
                Error::Other(format!(
                    "Run not found in project {}: {}",
                    project.name, label
                ))
            }),
        None => {
            let labels: Vec<&str> = project.runs.iter().map(|r| r.label.as_str()).collect();
            let idx = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Run")
                .items(&labels)
                .default(0)
                .interact()?;
            Ok(project.runs[idx].label.clone())
        }
    }
}

fn prompt_data_type() -> Result<DataType> {
    let labels: Vec<String> = DataType::ALL.iter().map(|d| d.to_string()).collect();
    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Data type")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(DataType::ALL[idx])
}

fn prompt_folder() -> Result<PathBuf> {
    let folder: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Data folder location")
        .interact_text()?;
    Ok(PathBuf::from(folder))
}
