//! Spreadsheet rendering for the processed-requests export.

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};

use crate::model::request::Request;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Report";
const HEADERS: [&str; 8] = [
    "ID",
    "Employee",
    "Type",
    "Start Date",
    "End Date",
    "Status",
    "Approver",
    "Updated At",
];
const COLUMN_WIDTHS: [f64; 8] = [8.0, 24.0, 14.0, 18.0, 18.0, 12.0, 20.0, 22.0];
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One exported line. The approver is blank for requests without one.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub id: u64,
    pub employee: String,
    pub request_type: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub approver: String,
    pub updated_at: String,
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

impl From<&Request> for ReportRow {
    fn from(request: &Request) -> Self {
        ReportRow {
            id: request.id,
            employee: request.user_name.clone().unwrap_or_default(),
            request_type: request.request_type.to_string(),
            start_date: timestamp(request.start_date),
            end_date: timestamp(request.end_date),
            status: request.status.to_string(),
            approver: request.approver_name.clone().unwrap_or_default(),
            updated_at: timestamp(request.updated_at),
        }
    }
}

pub fn export_filename(month: &str) -> String {
    format!("requests_{month}.xlsx")
}

/// Renders processed requests into an XLSX workbook and returns its bytes.
pub fn render_processed_requests(requests: &[Request]) -> Result<Vec<u8>, XlsxError> {
    let header_format = Format::new()
        .set_bold()
        .set_font_size(11)
        .set_background_color(Color::RGB(0xE5E7EB))
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let cell_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::VerticalCenter);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, title) in HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &header_format)?;
        }
        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            sheet.set_column_width(col as u16, *width)?;
        }

        for (idx, request) in requests.iter().enumerate() {
            let row = ReportRow::from(request);
            let r = idx as u32 + 1;

            sheet.write_number_with_format(r, 0, row.id as f64, &cell_format)?;
            let text_cells = [
                row.employee,
                row.request_type,
                row.start_date,
                row.end_date,
                row.status,
                row.approver,
                row.updated_at,
            ];
            for (offset, value) in text_cells.into_iter().enumerate() {
                sheet.write_string_with_format(r, offset as u16 + 1, value, &cell_format)?;
            }
        }

        sheet.set_freeze_panes(1, 0)?;
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::request::{RequestStatus, RequestType};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn processed(approver_name: Option<&str>) -> Request {
        Request {
            id: 12,
            user_id: 2,
            request_type: RequestType::Overtime,
            start_date: Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 3, 1, 21, 30, 0).unwrap(),
            reason: "release".into(),
            status: RequestStatus::Rejected,
            approver_id: approver_name.map(|_| 7),
            rejection_reason: Some("not needed".into()),
            created_at: Utc.with_ymd_and_hms(2024, 2, 28, 9, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 10, 15, 0).unwrap(),
            user_name: Some("Budi Santoso".into()),
            approver_name: approver_name.map(str::to_string),
        }
    }

    #[test]
    fn row_columns_follow_report_layout() {
        let row = ReportRow::from(&processed(Some("Sam Lee")));
        assert_eq!(
            row,
            ReportRow {
                id: 12,
                employee: "Budi Santoso".into(),
                request_type: "OVERTIME".into(),
                start_date: "2024-03-01 18:00".into(),
                end_date: "2024-03-01 21:30".into(),
                status: "REJECTED".into(),
                approver: "Sam Lee".into(),
                updated_at: "2024-02-29 10:15".into(),
            }
        );
    }

    #[test]
    fn missing_approver_is_blank() {
        let row = ReportRow::from(&processed(None));
        assert_eq!(row.approver, "");
    }

    #[test]
    fn workbook_is_a_zip_container() {
        let bytes = render_processed_requests(&[processed(Some("Sam Lee")), processed(None)]).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let empty = render_processed_requests(&[]).unwrap();
        assert!(empty.starts_with(b"PK"));
    }

    #[test]
    fn filename_carries_month() {
        assert_eq!(export_filename("2024-03"), "requests_2024-03.xlsx");
    }
}
