//! PostgREST 表操作

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::SupabaseClient;
use crate::baas::Storage;
use crate::baas::rows::{
    EVENTS_TABLE, EventRow, MATERIALS_TABLE, MESSAGES_TABLE, MaterialRow, MessageRow,
    NewEventRow, NewMaterialRow, NewMessageRow, STUDENTS_TABLE,
};
use crate::errors::{PortalError, Result};
use crate::models::{
    chat::{ChatMessage, NewMessage},
    events::{CalendarEvent, NewEvent},
    materials::{Material, NewMaterial},
    students::{Student, StudentPayload},
};

const RETURN_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

impl SupabaseClient {
    fn table_url(&self, table: &str) -> String {
        self.endpoint(&format!("/rest/v1/{table}"))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let request = self
            .http
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .query(query);
        let response = Self::check(self.as_caller(request).send().await?).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    async fn insert_one<B: Serialize, T: DeserializeOwned>(&self, table: &str, body: &B) -> Result<T> {
        let request = self
            .http
            .post(self.table_url(table))
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
            .json(&[body]);
        let response = Self::check(self.as_caller(request).send().await?).await?;
        response
            .json::<Vec<T>>()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PortalError::backend_request(format!("Insert into {table} returned no row")))
    }

    async fn update_by_id<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        body: &B,
    ) -> Result<Option<T>> {
        let request = self
            .http
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
            .json(body);
        let response = Self::check(self.as_caller(request).send().await?).await?;
        Ok(response.json::<Vec<T>>().await?.into_iter().next())
    }

    async fn delete_by_id(&self, table: &str, id: &str) -> Result<()> {
        let request = self
            .http
            .delete(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))]);
        Self::check(self.as_caller(request).send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for SupabaseClient {
    async fn list_materials(&self) -> Result<Vec<Material>> {
        let rows: Vec<MaterialRow> = self
            .select(MATERIALS_TABLE, &[("order", "created_at.desc".to_string())])
            .await?;
        Ok(rows.into_iter().map(Material::from).collect())
    }

    async fn insert_material(&self, material: NewMaterial) -> Result<Material> {
        let row: MaterialRow = self
            .insert_one(MATERIALS_TABLE, &NewMaterialRow::from(material))
            .await?;
        Ok(row.into())
    }

    async fn delete_material(&self, id: &str) -> Result<()> {
        self.delete_by_id(MATERIALS_TABLE, id).await
    }

    async fn list_events(&self) -> Result<Vec<CalendarEvent>> {
        let rows: Vec<EventRow> = self.select(EVENTS_TABLE, &[]).await?;
        Ok(rows.into_iter().map(CalendarEvent::from).collect())
    }

    async fn insert_event(&self, event: NewEvent) -> Result<CalendarEvent> {
        let row: EventRow = self
            .insert_one(EVENTS_TABLE, &NewEventRow::from(event))
            .await?;
        Ok(row.into())
    }

    async fn delete_event(&self, id: &str) -> Result<()> {
        self.delete_by_id(EVENTS_TABLE, id).await
    }

    async fn list_messages(&self, limit: usize) -> Result<Vec<ChatMessage>> {
        // 取最新的 limit 条，再翻转为正序
        let rows: Vec<MessageRow> = self
            .select(
                MESSAGES_TABLE,
                &[
                    ("order", "created_at.desc".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().rev().map(ChatMessage::from).collect())
    }

    async fn insert_message(&self, message: NewMessage) -> Result<ChatMessage> {
        let row: MessageRow = self
            .insert_one(MESSAGES_TABLE, &NewMessageRow::from(message))
            .await?;
        Ok(row.into())
    }

    async fn list_students(&self) -> Result<Vec<Student>> {
        self.select(STUDENTS_TABLE, &[]).await
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>> {
        let rows: Vec<Student> = self
            .select(
                STUDENTS_TABLE,
                &[("email", format!("eq.{email}")), ("limit", "1".to_string())],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_student(&self, student: StudentPayload) -> Result<Student> {
        self.insert_one(STUDENTS_TABLE, &student).await
    }

    async fn update_student(&self, id: &str, student: StudentPayload) -> Result<Option<Student>> {
        self.update_by_id(STUDENTS_TABLE, id, &student).await
    }

    async fn delete_student(&self, id: &str) -> Result<()> {
        self.delete_by_id(STUDENTS_TABLE, id).await
    }
}
