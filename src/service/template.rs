//! Message template management

use crate::domain::{
    CreateTemplateInput, MessageTemplate, NewTemplate, TemplateQuery, TemplateRef,
    UpdateTemplateInput,
};
use crate::email::template_variables;
use crate::error::{AppError, Result};
use crate::repository::TemplateRepository;
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

pub struct TemplateService<R: TemplateRepository> {
    repo: Arc<R>,
}

impl<R: TemplateRepository> TemplateService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, input: CreateTemplateInput) -> Result<MessageTemplate> {
        input.validate()?;
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Template name is required".to_string()));
        }

        if self.repo.find_by_name(&name).await?.is_some() {
            return Err(AppError::Conflict("Template name already exists".to_string()));
        }

        let new = NewTemplate {
            variables: template_variables(&input.subject, &input.body),
            name,
            subject: input.subject,
            body: input.body,
        };
        let template = self.repo.create(&new).await?;

        tracing::info!(
            template_id = template.id,
            name = %template.name,
            variables = ?template.variables,
            "Template created"
        );
        Ok(template)
    }

    pub async fn get(&self, id: i64) -> Result<MessageTemplate> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::TemplateNotFound(format!("#{}", id)))
    }

    /// Look a template up by id or by name
    pub async fn resolve(&self, template: &TemplateRef) -> Result<MessageTemplate> {
        let found = match template {
            TemplateRef::Id(id) => self.repo.find_by_id(*id).await?,
            TemplateRef::Name(name) => self.repo.find_by_name(name.trim()).await?,
        };
        found.ok_or_else(|| AppError::TemplateNotFound(template.to_string()))
    }

    /// One page of templates and the total number matching the query
    pub async fn list(&self, query: &TemplateQuery) -> Result<(Vec<MessageTemplate>, i64)> {
        let templates = self.repo.list(query).await?;
        let total = self.repo.count(query).await?;
        Ok((templates, total))
    }

    /// Apply the changed fields and recompute the variable set
    pub async fn update(&self, id: i64, input: UpdateTemplateInput) -> Result<MessageTemplate> {
        input.validate()?;
        let mut template = self.get(id).await?;

        if let Some(name) = input.name.map(|n| n.trim().to_string()) {
            if name.is_empty() {
                return Err(AppError::Validation("Template name is required".to_string()));
            }
            if name != template.name {
                if let Some(existing) = self.repo.find_by_name(&name).await? {
                    if existing.id != id {
                        return Err(AppError::Conflict(
                            "Template name already exists".to_string(),
                        ));
                    }
                }
                template.name = name;
            }
        }
        if let Some(subject) = input.subject {
            template.subject = subject;
        }
        if let Some(body) = input.body {
            template.body = body;
        }

        template.variables = template_variables(&template.subject, &template.body);
        template.updated_at = Utc::now();

        let updated = self.repo.update(&template).await?;
        tracing::info!(template_id = id, name = %updated.name, "Template updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let template = self.get(id).await?;
        self.repo.delete(id).await?;
        tracing::info!(template_id = id, name = %template.name, "Template deleted");
        Ok(())
    }

    /// Stamp the template as used now
    pub async fn mark_used(&self, id: i64) -> Result<()> {
        self.repo.touch_last_used(id, Utc::now()).await
    }
}
