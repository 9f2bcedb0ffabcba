// src/services/report_service.rs

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use genpdf::{elements, style, Element};

use crate::{
    common::error::AppError,
    models::{
        defect::{Defect, DefectDetailStatus, DefectStatus},
        project::ApartmentFilter,
        report::{ApartmentDefectSummary, DefectReport},
    },
    services::{defect_service::DefectService, project_service::ProjectService},
};

const FONT_FAMILY: &str = "Roboto";

#[derive(Clone)]
pub struct ReportService {
    defect_service: DefectService,
    project_service: ProjectService,
    fonts_dir: PathBuf,
}

impl ReportService {
    pub fn new(defect_service: DefectService, project_service: ProjectService, fonts_dir: PathBuf) -> Self {
        Self { defect_service, project_service, fonts_dir }
    }

    /// Contagem de defeitos por apartamento, a partir do armazenamento ativo.
    /// Com `project_id`, só entram os apartamentos da obra (por id ou número).
    pub async fn defect_report(&self, project_id: Option<uuid::Uuid>) -> Result<DefectReport, AppError> {
        let mut defects = self.defect_service.list_all().await?;

        if let Some(project_id) = project_id {
            let filter = ApartmentFilter { project_id: Some(project_id), ..Default::default() };
            let apartments = self.project_service.list_apartments(&filter).await?;
            defects.retain(|d| {
                apartments
                    .iter()
                    .any(|a| a.id.to_string() == d.apartment_id || a.number == d.apartment_id)
            });
        }

        Ok(summarize_defects(&defects))
    }

    pub async fn apartment_defects_pdf(&self, apartment_id: &str) -> Result<Vec<u8>, AppError> {
        let defects = self.defect_service.get_defects_by_apartment(apartment_id).await?;
        render_defects_pdf(&self.fonts_dir, apartment_id, &defects)
    }
}

pub fn summarize_defects(defects: &[Defect]) -> DefectReport {
    let mut per_apartment: BTreeMap<&str, ApartmentDefectSummary> = BTreeMap::new();

    for defect in defects {
        let entry = per_apartment
            .entry(defect.apartment_id.as_str())
            .or_insert_with(|| ApartmentDefectSummary {
                apartment_id: defect.apartment_id.clone(),
                total: 0,
                active: 0,
                fixed: 0,
            });
        entry.total += 1;
        match defect.status {
            DefectStatus::Active => entry.active += 1,
            DefectStatus::Fixed => entry.fixed += 1,
        }
    }

    let apartments: Vec<ApartmentDefectSummary> = per_apartment.into_values().collect();
    DefectReport {
        total: defects.len(),
        active: apartments.iter().map(|a| a.active).sum(),
        fixed: apartments.iter().map(|a| a.fixed).sum(),
        apartments,
    }
}

fn status_label(defect: &Defect) -> &'static str {
    match (defect.status, defect.detail_status) {
        (DefectStatus::Fixed, _) => "Corrigido",
        (_, Some(DefectDetailStatus::InProgress)) => "Em andamento",
        (_, Some(DefectDetailStatus::Resolved)) => "Resolvido",
        (_, Some(DefectDetailStatus::Closed)) => "Fechado",
        _ => "Aberto",
    }
}

fn render_defects_pdf(fonts_dir: &Path, apartment_id: &str, defects: &[Defect]) -> Result<Vec<u8>, AppError> {
    // Carrega a fonte da pasta configurada
    let font_family = genpdf::fonts::from_files(fonts_dir, FONT_FAMILY, None)
        .map_err(|_| AppError::FontNotFound(format!("{} em {}", FONT_FAMILY, fonts_dir.display())))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Defeitos - Apartamento {}", apartment_id));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    doc.push(
        elements::Paragraph::new(format!("RELATÓRIO DE DEFEITOS - APARTAMENTO {}", apartment_id))
            .styled(style::Style::new().bold().with_font_size(16)),
    );
    let summary = summarize_defects(defects);
    doc.push(elements::Paragraph::new(format!(
        "Total: {}  |  Ativos: {}  |  Corrigidos: {}",
        summary.total, summary.active, summary.fixed
    )));
    doc.push(elements::Break::new(1.5));

    // Pesos: título (4), status (2), marca na planta (2), data (2)
    let mut table = elements::TableLayout::new(vec![4, 2, 2, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let style_bold = style::Style::new().bold();
    table
        .row()
        .element(elements::Paragraph::new("Defeito").styled(style_bold))
        .element(elements::Paragraph::new("Status").styled(style_bold))
        .element(elements::Paragraph::new("Planta (x, y)").styled(style_bold))
        .element(elements::Paragraph::new("Registrado").styled(style_bold))
        .push()
        .map_err(|e| anyhow::anyhow!("Falha na tabela do PDF: {}", e))?;

    for defect in defects {
        let mut title = elements::LinearLayout::vertical();
        title.push(elements::Paragraph::new(defect.title.clone()));
        if let Some(description) = &defect.description {
            title.push(
                elements::Paragraph::new(description.clone())
                    .styled(style::Style::new().italic().with_font_size(8)),
            );
        }

        table
            .row()
            .element(title)
            .element(elements::Paragraph::new(status_label(defect)))
            .element(elements::Paragraph::new(format!("{:.1}%, {:.1}%", defect.x_coord, defect.y_coord)))
            .element(elements::Paragraph::new(defect.created_at.format("%d/%m/%Y").to_string()))
            .push()
            .map_err(|e| anyhow::anyhow!("Falha na tabela do PDF: {}", e))?;
    }

    doc.push(table);

    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| anyhow::anyhow!("Falha ao renderizar PDF: {}", e))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn defect(apartment: &str, status: DefectStatus) -> Defect {
        let now = Utc::now();
        Defect {
            id: Uuid::new_v4(),
            apartment_id: apartment.into(),
            title: "Trinca".into(),
            description: None,
            photo_url: None,
            status,
            detail_status: None,
            x_coord: 10.0,
            y_coord: 10.0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn defects_are_counted_per_apartment() {
        let defects = vec![
            defect("101", DefectStatus::Active),
            defect("101", DefectStatus::Fixed),
            defect("102", DefectStatus::Active),
        ];
        let report = summarize_defects(&defects);

        assert_eq!(report.total, 3);
        assert_eq!(report.active, 2);
        assert_eq!(report.fixed, 1);
        assert_eq!(
            report.apartments[0],
            ApartmentDefectSummary { apartment_id: "101".into(), total: 2, active: 1, fixed: 1 }
        );
        assert_eq!(report.apartments[1].apartment_id, "102");
    }

    #[test]
    fn missing_fonts_are_reported() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = render_defects_pdf(temp.path(), "101", &[]).unwrap_err();
        assert!(matches!(err, AppError::FontNotFound(_)));
    }

    #[test]
    fn fixed_status_wins_over_detail() {
        let mut d = defect("101", DefectStatus::Fixed);
        d.detail_status = Some(DefectDetailStatus::InProgress);
        assert_eq!(status_label(&d), "Corrigido");
    }
}
