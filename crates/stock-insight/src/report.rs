//! Excel export of an analysis report

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

use crate::engine::AnalysisReport;
use crate::error::Result;

/// MIME type of the generated workbook
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Number of most recent bars written to the price sheet
pub const PRICE_ROWS: usize = 250;

/// Sheet names in workbook order
pub const SHEETS: [&str; 6] = ["Price", "Valuation", "MACD", "KDJ", "Signals", "News"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Builds the multi-sheet workbook offered for download
pub struct ExcelReport<'a> {
    report: &'a AnalysisReport,
    header: Format,
    decimal: Format,
}

impl<'a> ExcelReport<'a> {
    pub fn new(report: &'a AnalysisReport) -> Self {
        Self {
            report,
            header: Format::new().set_bold(),
            decimal: Format::new().set_num_format("0.00"),
        }
    }

    /// Render the workbook into memory
    pub fn build(report: &AnalysisReport) -> Result<Vec<u8>> {
        ExcelReport::new(report).to_bytes()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = self.workbook()?;
        let bytes = workbook.save_to_buffer()?;
        debug!(symbol = %self.report.symbol, bytes = bytes.len(), "excel report rendered");
        Ok(bytes)
    }

    /// Assemble the sheets listed in [`SHEETS`]
    pub fn workbook(&self) -> Result<Workbook> {
        let mut workbook = Workbook::new();

        self.write_prices(workbook.add_worksheet().set_name("Price")?)?;
        self.write_valuation(workbook.add_worksheet().set_name("Valuation")?)?;
        self.write_macd(workbook.add_worksheet().set_name("MACD")?)?;
        self.write_kdj(workbook.add_worksheet().set_name("KDJ")?)?;
        self.write_signals(workbook.add_worksheet().set_name("Signals")?)?;
        self.write_news(workbook.add_worksheet().set_name("News")?)?;
        Ok(workbook)
    }

    fn write_header(&self, sheet: &mut Worksheet, columns: &[&str]) -> Result<()> {
        for (col, title) in (0u16..).zip(columns) {
            sheet.write_string_with_format(0, col, *title, &self.header)?;
            sheet.set_column_width(col, 14)?;
        }
        sheet.set_freeze_panes(1, 0)?;
        Ok(())
    }

    fn write_optional(&self, sheet: &mut Worksheet, row: u32, col: u16, value: Option<f64>) -> Result<()> {
        if let Some(v) = value {
            sheet.write_number_with_format(row, col, v, &self.decimal)?;
        }
        Ok(())
    }

    fn write_prices(&self, sheet: &mut Worksheet) -> Result<()> {
        self.write_header(sheet, &["Date", "Open", "High", "Low", "Close", "Volume"])?;

        for (row, bar) in (1u32..).zip(self.report.prices.tail(PRICE_ROWS)) {
            sheet.write_string(row, 0, bar.date.format(DATE_FORMAT).to_string())?;
            sheet.write_number_with_format(row, 1, bar.open, &self.decimal)?;
            sheet.write_number_with_format(row, 2, bar.high, &self.decimal)?;
            sheet.write_number_with_format(row, 3, bar.low, &self.decimal)?;
            sheet.write_number_with_format(row, 4, bar.close, &self.decimal)?;
            sheet.write_number(row, 5, bar.volume as f64)?;
        }
        Ok(())
    }

    fn write_valuation(&self, sheet: &mut Worksheet) -> Result<()> {
        self.write_header(sheet, &["指标 / Metric", "值 / Value"])?;
        sheet.set_column_width(0, 24)?;

        let metrics = &self.report.valuation;
        let rows = [
            ("PE_TTM", metrics.pe_ttm),
            ("PB", metrics.pb),
            ("ROE", metrics.roe),
            ("ProfitGrowthYoY", metrics.profit_growth_yoy),
            ("IndustryAvgPE", metrics.industry_avg_pe),
        ];

        let mut row = 1u32;
        for (name, value) in rows {
            sheet.write_string(row, 0, name)?;
            self.write_optional(sheet, row, 1, value)?;
            row += 1;
        }
        sheet.write_string(row, 0, "Source")?;
        sheet.write_string(row, 1, metrics.origin.label())?;
        Ok(())
    }

    fn write_macd(&self, sheet: &mut Worksheet) -> Result<()> {
        self.write_header(sheet, &["Date", "DIF", "DEA", "MACD"])?;

        for (row, point) in (1u32..).zip(&self.report.macd) {
            sheet.write_string(row, 0, point.date.format(DATE_FORMAT).to_string())?;
            sheet.write_number_with_format(row, 1, point.values.dif, &self.decimal)?;
            sheet.write_number_with_format(row, 2, point.values.dea, &self.decimal)?;
            sheet.write_number_with_format(row, 3, point.values.histogram, &self.decimal)?;
        }
        Ok(())
    }

    fn write_kdj(&self, sheet: &mut Worksheet) -> Result<()> {
        self.write_header(sheet, &["Date", "K", "D", "J"])?;

        for (row, point) in (1u32..).zip(&self.report.kdj) {
            sheet.write_string(row, 0, point.date.format(DATE_FORMAT).to_string())?;
            self.write_optional(sheet, row, 1, point.values.k)?;
            self.write_optional(sheet, row, 2, point.values.d)?;
            self.write_optional(sheet, row, 3, point.values.j)?;
        }
        Ok(())
    }

    fn write_signals(&self, sheet: &mut Worksheet) -> Result<()> {
        self.write_header(sheet, &["Signal", "Bias"])?;
        sheet.set_column_width(0, 36)?;

        if self.report.signals.is_empty() {
            sheet.write_string(1, 0, "无明确信号 (no clear signal)")?;
            return Ok(());
        }
        for (row, signal) in (1u32..).zip(&self.report.signals) {
            sheet.write_string(row, 0, signal.label())?;
            sheet.write_string(row, 1, if signal.is_bullish() { "bullish" } else { "bearish" })?;
        }
        Ok(())
    }

    fn write_news(&self, sheet: &mut Worksheet) -> Result<()> {
        self.write_header(sheet, &["Date", "Source", "Headline", "Sentiment"])?;
        sheet.set_column_width(2, 60)?;

        let news = &self.report.news;
        if news.headlines.is_empty() {
            sheet.write_string(1, 0, &news.summary)?;
            return Ok(());
        }
        for (row, item) in (1u32..).zip(&news.headlines) {
            let h = &item.headline;
            sheet.write_string(row, 0, h.published.format(DATE_FORMAT).to_string())?;
            sheet.write_string(row, 1, &h.source)?;
            if h.url.is_empty() {
                sheet.write_string(row, 2, &h.title)?;
            } else {
                sheet.write_url_with_text(row, 2, h.url.as_str(), &h.title)?;
            }
            sheet.write_string(row, 3, item.sentiment.label())?;
        }
        Ok(())
    }
}

/// Download name for a ticker's workbook
pub fn file_name(code: &str) -> String {
    format!("{}_report.xlsx", code.trim())
}
