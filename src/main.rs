use std::fs;
use std::io::Read;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use mailtree::{
    verify, Cli, DispatchQueue, Document, MailtreeError, ResolvedMail, Result, SendGridTransport,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    mailtree::logging::init(cli.log_level());

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let raw = read_source(cli)?;
    let document = Document::from_yaml(&raw)?;

    let mails = document.resolve_all();
    for mail in &mails {
        info!("{mail}");
    }

    let errors = verify(&mails);

    if cli.test {
        for (i, mail) in mails.iter().enumerate() {
            if i != 0 {
                println!("{}", "=".repeat(30));
            }
            print_mail(mail);
        }
        for e in &errors {
            warn!("{e}");
        }
        return Ok(exit_code(errors.is_empty()));
    }

    if !errors.is_empty() {
        for e in &errors {
            error!("{e}");
        }
        error!(
            "refusing to send: {} validation error(s); run with --test to inspect",
            errors.len()
        );
        return Ok(ExitCode::FAILURE);
    }

    if document.apikey.is_empty() {
        return Err(MailtreeError::Config(
            "apikey is required to send mail".to_string(),
        ));
    }

    let transport = SendGridTransport::new(&document.apikey)?;
    let queue = DispatchQueue::new(transport, document.retry.clone());
    let report = queue.send_all(mails);

    info!("sent {} mail(s)", report.sent);
    for dead in &report.dead {
        error!("undelivered mail to {}: {}", dead.mail.fields.to, dead.reason);
    }

    Ok(exit_code(report.all_sent()))
}

fn read_source(cli: &Cli) -> Result<String> {
    match &cli.source {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

fn print_mail(mail: &ResolvedMail) {
    let fields = &mail.fields;
    println!("title: {}", fields.title);
    println!("from: {}", fields.from);
    println!("to: {}", fields.to);
    println!("cc: {}", fields.cc);
    println!("bcc: {}", fields.bcc);
    match fields.date {
        Some(date) => println!("date: {date}"),
        None => println!("date: -"),
    }
    println!("attached: {}", fields.attach.join(", "));
    println!();
    println!("{}", mail.body_string());
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
