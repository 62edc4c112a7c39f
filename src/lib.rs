/*!
# Waste Tracker

A small internal web application for recording and reporting waste-disposal
movements, built in Rust.

## Overview

Operators log in, upload CSV batches of waste-movement records, view them in
tabular form, and export them as an Excel workbook, a PDF document, or an
operator-composed email. Storage is an in-memory, insertion-ordered list of
rows guarded by a single lock; authentication is a static two-account lookup
with argon2-hashed passwords.

## Architecture

- **Backend**: Rust, axum
  - Movement store - ordered in-memory record list shared via application state
  - CSV ingester - header-driven row parsing with quote handling
  - Report renderers - Excel (rust_xlsxwriter) and paginated PDF (printpdf)
  - Session table - UUID cookie sessions with a coarse role gate
  - Notifier - one-shot STARTTLS SMTP sends via lettre
- **Frontend**: static HTML pages; record tables are rendered client-side
  from a JSON payload injected into each page

## Modules

- **app**: routing, application state and request handlers
- **config**: environment-driven settings
- **ingest**: CSV-to-record conversion
- **login**: credential table, sessions and the role gate
- **mailer**: SMTP notifier
- **report**: Excel and PDF export
- **store**: the movement store and record type

## HTTP routes

- `/` - redirect to the dashboard
- `/login`, `/logout` - session management
- `/dashboard` - record table (authenticated)
- `/upload` - CSV batch upload (admin)
- `/tracking-log`, `/generate-report` - record views
- `/send-email` - operator-composed email (admin)
- `/download_excel`, `/download_pdf` - report attachments
*/

pub mod app;
pub mod config;
pub mod ingest;
pub mod login;
pub mod mailer;
pub mod report;
pub mod store;

/// Re-export everything from these modules to make it easier to use
pub use app::*;
pub use config::*;
pub use ingest::*;
pub use login::*;
pub use mailer::*;
pub use report::*;
pub use store::*;
