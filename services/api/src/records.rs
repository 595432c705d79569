use chrono::Utc;
use clap::Subcommand;
use job_intake::config::AppConfig;
use job_intake::error::AppError;
use job_intake::workflows::applications::{
    build_export, read_records, ApplicationId, StoredApplication,
};
use job_intake::workflows::form::display_or;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub(crate) enum ApplicationsCommand {
    /// One line per stored application
    List,
    /// Print a single application as JSON
    Show {
        /// Application id, e.g. APP-LOYW3V28
        id: String,
    },
    /// Write the flat export document
    Export {
        /// Destination file (defaults to job-applications-export-YYYY-MM-DD.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

pub(crate) fn run_applications(
    data_file: Option<PathBuf>,
    command: ApplicationsCommand,
) -> Result<(), AppError> {
    let data_file = match data_file {
        Some(path) => path,
        None => AppConfig::load()?.storage.data_file,
    };
    let records = read_records(&data_file)?;

    match command {
        ApplicationsCommand::List => {
            println!("{} application(s) in {}", records.len(), data_file.display());
            for record in &records {
                println!("{}", summary_line(record));
            }
        }
        ApplicationsCommand::Show { id } => {
            let id = ApplicationId(id);
            let record = records.iter().find(|record| record.id == id).ok_or_else(|| {
                AppError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Application not found: {id}"),
                ))
            })?;
            println!("{}", to_pretty_json(record)?);
        }
        ApplicationsCommand::Export { output } => {
            let export = build_export(&records, Utc::now());
            let output = output.unwrap_or_else(|| PathBuf::from(export.file_name()));
            write_export(&output, &to_pretty_json(&export)?)?;
            println!(
                "Exported {} application(s) to {}",
                export.export_info.total_applications,
                output.display()
            );
        }
    }

    Ok(())
}

pub(crate) fn summary_line(record: &StoredApplication) -> String {
    let email = record
        .account
        .as_ref()
        .map(|account| account.email.as_str())
        .filter(|email| !email.is_empty())
        .unwrap_or("N/A");
    let name = format!(
        "{} {}",
        display_or(&record.fields, "firstName", "N/A"),
        display_or(&record.fields, "lastName", "N/A")
    );
    format!(
        "- {} | {} | {} | {} | {}",
        record.id,
        record.status.label(),
        record.submission_time.format("%Y-%m-%d %H:%M"),
        name,
        email
    )
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}

fn write_export(path: &Path, contents: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}
