use crate::error::Result;
use crate::models::user::User;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

pub struct ExportService;

impl ExportService {
    /// Generate a styled XLSX workbook from the user list.
    pub fn generate_users_xlsx(users: &[User]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Users")?;

        let header_bg = Color::RGB(0x0F172A);
        let border_color = Color::RGB(0xE2E8F0);
        let alt_row = Color::RGB(0xF8FAFC);

        let columns = [
            ("#", 8.0),
            ("Name", 30.0),
            ("Email", 34.0),
            ("Role", 14.0),
            ("Onboarded", 12.0),
            ("Created", 20.0),
        ];

        for (i, (_, width)) in columns.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }

        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(Color::White)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        worksheet.set_row_height(0, 26)?;
        for (i, (name, _)) in columns.iter().enumerate() {
            worksheet.write_string_with_format(0, i as u16, *name, &header_format)?;
        }

        for (idx, user) in users.iter().enumerate() {
            let row = 1 + idx as u32;
            let bg = if idx % 2 == 0 { alt_row } else { Color::White };

            let base_fmt = Format::new()
                .set_font_size(10)
                .set_background_color(bg)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);

            worksheet.write_number_with_format(row, 0, (idx + 1) as f64, &center_fmt)?;
            worksheet.write_string_with_format(row, 1, &user.name, &base_fmt)?;
            worksheet.write_string_with_format(row, 2, &user.email, &base_fmt)?;
            worksheet.write_string_with_format(row, 3, &user.role, &center_fmt)?;
            worksheet.write_string_with_format(
                row,
                4,
                if user.onboarding_complete { "yes" } else { "no" },
                &center_fmt,
            )?;
            let created = user.created_at.format("%d.%m.%Y %H:%M").to_string();
            worksheet.write_string_with_format(row, 5, &created, &center_fmt)?;
        }

        worksheet.set_freeze_panes(1, 0)?;
        if !users.is_empty() {
            worksheet.autofilter(0, 0, users.len() as u32, (columns.len() - 1) as u16)?;
        }

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}
