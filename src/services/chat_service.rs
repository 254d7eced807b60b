//! ChatService - Regole di business della chat di assistenza
//!
//! Tutta la logica di instradamento messaggi, indipendente dal trasporto:
//! validazione mittente/destinatario, messaggio di benvenuto al primo
//! contatto, stato di lettura, calcolo del pool di assistenza. Generico sui
//! due gateway così i test lo esercitano con double in-memory.

use crate::core::config::ChatConfig;
use crate::core::AppError;
use crate::dtos::NewMessageDTO;
use crate::entities::{ChatMessage, UserAccount};
use crate::repositories::{MessageStore, UserDirectory};
use chrono::Utc;
use futures::future;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

pub struct ChatService<S, D> {
    store: S,
    directory: D,
    config: ChatConfig,
}

impl<S: MessageStore, D: UserDirectory> ChatService<S, D> {
    pub fn new(store: S, directory: D, config: ChatConfig) -> Self {
        Self {
            store,
            directory,
            config,
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Conversazione completa dell'utente, ordinata per istante di invio.
    ///
    /// Lettura con effetto collaterale: al primo contatto (nessun messaggio
    /// presente) viene persistito un solo messaggio di benvenuto firmato
    /// dall'identità di sistema e la sequenza viene riletta. Il controllo di
    /// vuotezza rende l'operazione idempotente su chiamate ripetute; il
    /// check-then-insert però non è atomico attraverso il gateway, quindi due
    /// primi contatti simultanei dello stesso utente possono inserire due
    /// benvenuti (caso peggiore: saluto duplicato).
    #[instrument(skip(self), fields(user_id))]
    pub async fn conversation(&self, user_id: i32) -> Result<Vec<ChatMessage>, AppError> {
        let messages = self.store.find_by_participant(&user_id).await?;
        if !messages.is_empty() {
            return Ok(messages);
        }

        info!("First contact, inserting system welcome message");
        self.send_message(
            self.config.system_user_id,
            Some(user_id),
            &self.config.welcome_message,
            true,
        )
        .await?;

        Ok(self.store.find_by_participant(&user_id).await?)
    }

    /// Conversazione tra esattamente quella coppia di utenti (inclusi i
    /// messaggi al pool inviati da uno dei due), ordinata per istante di invio
    pub async fn conversation_between(
        &self,
        user_a: i32,
        user_b: i32,
    ) -> Result<Vec<ChatMessage>, AppError> {
        Ok(self.store.find_by_pair(&user_a, &user_b).await?)
    }

    /// Messaggi non letti indirizzati all'utente
    pub async fn unread(&self, user_id: i32) -> Result<Vec<ChatMessage>, AppError> {
        Ok(self.store.find_unread(&user_id).await?)
    }

    pub async fn unread_count(&self, user_id: i32) -> Result<usize, AppError> {
        Ok(self.store.find_unread(&user_id).await?.len())
    }

    /// Ultimi `limit` messaggi che coinvolgono l'utente, dal più recente
    pub async fn recent(&self, user_id: i32, limit: i64) -> Result<Vec<ChatMessage>, AppError> {
        Ok(self.store.find_recent(&user_id, limit).await?)
    }

    /// Marca il messaggio come letto. Idempotente: messaggio assente o già
    /// letto => no-op silenzioso (`None`), così i retry dei client restano
    /// economici. Ritorna il messaggio aggiornato solo se la transizione è
    /// avvenuta in questa chiamata.
    #[instrument(skip(self), fields(message_id))]
    pub async fn mark_read(&self, message_id: i32) -> Result<Option<ChatMessage>, AppError> {
        let Some(message) = self.store.find_by_id(&message_id).await? else {
            debug!("Mark read on absent message, ignoring");
            return Ok(None);
        };

        if message.is_read {
            return Ok(None);
        }

        let now = Utc::now();
        self.store.mark_read(&message_id, &now).await?;

        Ok(Some(ChatMessage {
            is_read: true,
            read_at: Some(now),
            ..message
        }))
    }

    /// Marca come letti tutti i messaggi non letti inviati da `other_id` e
    /// indirizzati a `user_id`. Idempotente; ritorna i messaggi transitati in
    /// questa chiamata (vuoto se non c'era nulla da marcare).
    #[instrument(skip(self), fields(user_id, other_id))]
    pub async fn mark_conversation_read(
        &self,
        user_id: i32,
        other_id: i32,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let targets: Vec<ChatMessage> = self
            .store
            .find_unread(&user_id)
            .await?
            .into_iter()
            .filter(|m| m.sender_id == other_id)
            .collect();

        if targets.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let results = future::join_all(
            targets
                .iter()
                .map(|m| self.store.mark_read(&m.message_id, &now)),
        )
        .await;
        for result in results {
            result?;
        }

        info!(marked = targets.len(), "Conversation marked as read");

        Ok(targets
            .into_iter()
            .map(|m| ChatMessage {
                is_read: true,
                read_at: Some(now),
                ..m
            })
            .collect())
    }

    /// Valida e persiste un messaggio. `recipient_id` assente significa
    /// "broadcast al pool di assistenza" e non viene validato come identità
    /// singola. Il mittente viene verificato in anagrafica, tranne quando
    /// coincide con l'identità di sistema riservata.
    #[instrument(skip(self, content), fields(sender_id, from_support))]
    pub async fn send_message(
        &self,
        sender_id: i32,
        recipient_id: Option<i32>,
        content: &str,
        from_support: bool,
    ) -> Result<ChatMessage, AppError> {
        // sent_at assegnato qui, alla persistenza: è il riferimento
        // autoritativo per l'ordinamento
        let new_message = NewMessageDTO {
            sender_id,
            recipient_id,
            content: content.to_string(),
            sent_at: Utc::now(),
            from_support,
        };

        new_message.validate()?;

        if sender_id != self.config.system_user_id
            && self.directory.find_by_id(&sender_id).await?.is_none()
        {
            warn!("Message from unknown sender rejected");
            return Err(AppError::unauthorized("Sender not found"));
        }

        if let Some(recipient_id) = recipient_id {
            if self.directory.find_by_id(&recipient_id).await?.is_none() {
                warn!(recipient_id, "Message to unknown recipient rejected");
                return Err(AppError::unauthorized("Recipient not found"));
            }
        }

        let stored = self.store.append(&new_message).await?;
        debug!(message_id = stored.message_id, "Message persisted");
        Ok(stored)
    }

    /// Utente -> pool di assistenza: risolve l'utente in anagrafica e invia
    /// il messaggio in broadcast (nessun destinatario esplicito)
    pub async fn process_user_message(
        &self,
        user_id: i32,
        content: &str,
    ) -> Result<ChatMessage, AppError> {
        if self.directory.find_by_id(&user_id).await?.is_none() {
            return Err(AppError::unauthorized("User not found"));
        }

        self.send_message(user_id, None, content, false).await
    }

    /// Assistenza -> utente: risolve l'operatore in anagrafica e forza la
    /// direzione `from_support`
    pub async fn process_support_message(
        &self,
        sender_id: i32,
        recipient_id: i32,
        content: &str,
    ) -> Result<ChatMessage, AppError> {
        if self.directory.find_by_id(&sender_id).await?.is_none() {
            return Err(AppError::unauthorized("Support user not found"));
        }

        self.send_message(sender_id, Some(recipient_id), content, true)
            .await
    }

    /// Identità del pool di assistenza, ricalcolate a ogni chiamata
    /// dall'anagrafica: nessuna cache, così un cambio ruolo ha effetto
    /// immediato sull'instradamento
    pub async fn support_user_ids(&self) -> Result<HashSet<i32>, AppError> {
        let users = self.directory.list_all().await?;
        Ok(users
            .into_iter()
            .filter(|u| u.role.is_support())
            .map(|u| u.user_id)
            .collect())
    }

    /// L'utente appartiene al pool di assistenza? (assente => no)
    pub async fn is_support(&self, user_id: i32) -> Result<bool, AppError> {
        Ok(self
            .directory
            .find_by_id(&user_id)
            .await?
            .map(|u| u.role.is_support())
            .unwrap_or(false))
    }

    pub async fn find_user(&self, user_id: i32) -> Result<Option<UserAccount>, AppError> {
        Ok(self.directory.find_by_id(&user_id).await?)
    }
}
