//! Minimal SpreadsheetML (xlsx) writer.
//!
//! Strings are written inline, formulas without cached values, and the
//! workbook asks for a full recalculation on load so every formula shows its
//! value the first time the file is opened.

use std::io::{Cursor, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::FileOptions;

use crate::error::WorkbookError;
use crate::model::{Cell, Sheet, WorkbookModel, col_letter};

const CONTENT_TYPES_HEAD: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" "#,
    r#"ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/"#,
    r#"vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/styles.xml" ContentType="application/"#,
    r#"vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    r#"<Override PartName="/docProps/core.xml" "#,
    r#"ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
    r#"<Override PartName="/docProps/app.xml" ContentType="application/"#,
    r#"vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
);

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" "#,
    r#"Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" "#,
    r#"Target="xl/workbook.xml"/>"#,
    r#"<Relationship Id="rId2" "#,
    r#"Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/"#,
    r#"core-properties" "#,
    r#"Target="docProps/core.xml"/>"#,
    r#"<Relationship Id="rId3" "#,
    r#"Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/"#,
    r#"extended-properties" "#,
    r#"Target="docProps/app.xml"/>"#,
    "</Relationships>",
);

// Style 0 is normal, style 1 is bold.
const STYLES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="2">"#,
    r#"<font><sz val="11"/><name val="Calibri"/></font>"#,
    r#"<font><b/><sz val="11"/><name val="Calibri"/></font>"#,
    "</fonts>",
    r#"<fills count="2">"#,
    r#"<fill><patternFill patternType="none"/></fill>"#,
    r#"<fill><patternFill patternType="gray125"/></fill>"#,
    "</fills>",
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1">"#,
    r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>"#,
    "</cellStyleXfs>",
    r#"<cellXfs count="2">"#,
    r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
    r#"<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>"#,
    "</cellXfs>",
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    "</styleSheet>",
);

const PRESERVED_T: &str = r#"<t xml:space="preserve">"#;
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const SHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const WORKSHEET_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";

fn content_types(sheet_count: usize) -> String {
    let mut xml = String::from(CONTENT_TYPES_HEAD);
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="{WORKSHEET_TYPE}"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn core_props(title: &str, created: DateTime<Utc>) -> String {
    let stamp = created.format("%Y-%m-%dT%H:%M:%SZ");
    let namespaces = concat!(
        r#"xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" "#,
        r#"xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#,
    );
    format!(
        "{XML_DECL}\n<cp:coreProperties {namespaces}>\
         <dc:title>{title}</dc:title><dc:creator>sowcraft</dc:creator>\
         <dcterms:created xsi:type=\"dcterms:W3CDTF\">{stamp}</dcterms:created>\
         <dcterms:modified xsi:type=\"dcterms:W3CDTF\">{stamp}</dcterms:modified>\
         </cp:coreProperties>",
        title = escape(title)
    )
}

fn app_props(sheets: &[Sheet]) -> String {
    let names: String = sheets
        .iter()
        .map(|s| format!("<vt:lpstr>{}</vt:lpstr>", escape(&s.name)))
        .collect();
    let namespaces = concat!(
        r#"xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
        r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes""#,
    );
    format!(
        "{XML_DECL}\n<Properties {namespaces}><Application>sowcraft</Application>\
         <TitlesOfParts><vt:vector size=\"{}\" baseType=\"lpstr\">{names}</vt:vector>\
         </TitlesOfParts></Properties>",
        sheets.len()
    )
}

fn workbook_xml(sheets: &[Sheet]) -> String {
    // The active tab must be a visible sheet; the summary always comes first.
    let mut xml = format!(r#"{XML_DECL}
<workbook xmlns="{SHEET_NS}" xmlns:r="{REL_NS}">"#);
    xml.push_str(r#"<bookViews><workbookView activeTab="0"/></bookViews><sheets>"#);
    for (i, sheet) in sheets.iter().enumerate() {
        let id = i + 1;
        let state = if sheet.hidden { r#" state="hidden""# } else { "" };
        xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{id}"{state} r:id="rId{id}"/>"#,
            escape(&sheet.name)
        ));
    }
    xml.push_str(r#"</sheets><calcPr calcId="191029" fullCalcOnLoad="1"/></workbook>"#);
    xml
}

fn workbook_rels(sheet_count: usize) -> String {
    let mut xml = format!("{XML_DECL}\n<Relationships xmlns=\"{PKG_REL_NS}\">");
    for id in 1..=sheet_count {
        let target = format!("worksheets/sheet{id}.xml");
        xml.push_str(&format!(
            r#"<Relationship Id="rId{id}" Type="{REL_NS}/worksheet" Target="{target}"/>"#
        ));
    }
    let styles = sheet_count + 1;
    xml.push_str(&format!(
        r#"<Relationship Id="rId{styles}" Type="{REL_NS}/styles" Target="styles.xml"/>"#
    ));
    xml.push_str("</Relationships>");
    xml
}

fn sheet_xml(sheet: &Sheet) -> String {
    let mut xml = format!(r#"{XML_DECL}
<worksheet xmlns="{SHEET_NS}" xmlns:r="{REL_NS}">"#);

    if !sheet.widths.is_empty() {
        xml.push_str("<cols>");
        for (i, width) in sheet.widths.iter().enumerate() {
            let n = i + 1;
            xml.push_str(&format!(r#"<col min="{n}" max="{n}" width="{width}" customWidth="1"/>"#));
        }
        xml.push_str("</cols>");
    }

    xml.push_str("<sheetData>");
    for (i, row) in sheet.rows.iter().enumerate() {
        if row.cells.is_empty() {
            continue;
        }
        let r = i + 1;
        xml.push_str(&format!(r#"<row r="{r}">"#));
        let style = if row.bold { r#" s="1""# } else { "" };
        for (c, cell) in row.cells.iter().enumerate() {
            let at = format!("{}{r}", col_letter(c));
            match cell {
                Cell::Empty => {}
                Cell::Text(text) => xml.push_str(&format!(
                    r#"<c r="{at}"{style} t="inlineStr"><is>{PRESERVED_T}{}</t></is></c>"#,
                    escape(text)
                )),
                Cell::Number(n) => {
                    xml.push_str(&format!(r#"<c r="{at}"{style}><v>{n}</v></c>"#))
                }
                Cell::Formula(f) => {
                    xml.push_str(&format!(r#"<c r="{at}"{style}><f>{}</f></c>"#, escape(f)))
                }
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Entity-escape for element text and double-quoted attributes.
fn escape(s: &str) -> String {
    // Control characters other than tab/newline are not valid XML 1.0.
    let printable: String = s
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    html_escape::encode_double_quoted_attribute(&printable).into_owned()
}
