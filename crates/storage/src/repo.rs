use {
    chrono::DateTime,
    newsroll_common::{ChannelHandle, Error, Post, Result},
};

#[derive(sqlx::FromRow)]
struct PostRow {
    handle: String,
    msg_id: i64,
    date: i64,
    text: String,
    permalink: Option<String>,
}

impl PostRow {
    fn into_post(self) -> Result<Post> {
        Ok(Post {
            channel: ChannelHandle::new(self.handle)?,
            msg_id: self.msg_id,
            date: DateTime::from_timestamp(self.date, 0).unwrap_or_default(),
            text: self.text,
            permalink: self.permalink,
        })
    }
}

/// Repository over users, channels, and their relations.
#[derive(Clone)]
pub struct ChannelRepo {
    pool: sqlx::SqlitePool,
}

impl ChannelRepo {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    /// Ensure a user row exists and return its internal id.
    pub async fn ensure_user(&self, tg_user_id: i64) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO users (tg_user_id) VALUES (?)
               ON CONFLICT(tg_user_id) DO UPDATE SET tg_user_id = excluded.tg_user_id
               RETURNING id"#,
        )
        .bind(tg_user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::storage("ensure user", e))
    }

    /// All channels saved by a user, ordered by handle.
    pub async fn list_channels_for_user(&self, tg_user_id: i64) -> Result<Vec<ChannelHandle>> {
        let rows = sqlx::query_scalar::<_, String>(
            r#"SELECT c.handle
               FROM users u
               JOIN user_channels uc ON uc.user_id = u.id
               JOIN channels c ON c.id = uc.channel_id
               WHERE u.tg_user_id = ?
               ORDER BY c.handle ASC"#,
        )
        .bind(tg_user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::storage("list channels", e))?;

        rows.into_iter().map(ChannelHandle::new).collect()
    }

    /// Save channel relations for a user under the per-user capacity cap.
    ///
    /// Returns `(added, already_present, rejected_over_limit)`. Calling with
    /// an empty handle list is a contract violation.
    pub async fn add_channels_for_user(
        &self,
        tg_user_id: i64,
        handles: &[ChannelHandle],
        max_per_user: usize,
    ) -> Result<(Vec<ChannelHandle>, Vec<ChannelHandle>, Vec<ChannelHandle>)> {
        if handles.is_empty() {
            return Err(Error::validation("handles is empty"));
        }

        let mut unique: Vec<&ChannelHandle> = Vec::new();
        for handle in handles {
            if !unique.contains(&handle) {
                unique.push(handle);
            }
        }

        let user_id = self.ensure_user(tg_user_id).await?;
        let current: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_channels WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::storage("count channels", e))?;

        let allowed_new = max_per_user.saturating_sub(current as usize);
        let (process_now, over_limit) =
            unique.split_at(allowed_new.min(unique.len()));
        let rejected: Vec<ChannelHandle> = over_limit.iter().map(|h| (*h).clone()).collect();

        let mut added = Vec::new();
        let mut already = Vec::new();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::storage("begin transaction", e))?;

        for handle in process_now {
            let channel_id = sqlx::query_scalar::<_, i64>(
                r#"INSERT INTO channels (handle) VALUES (?)
                   ON CONFLICT(handle) DO UPDATE SET handle = excluded.handle
                   RETURNING id"#,
            )
            .bind(handle.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| Error::storage("upsert channel", e))?;

            let inserted = sqlx::query(
                r#"INSERT INTO user_channels (user_id, channel_id) VALUES (?, ?)
                   ON CONFLICT(user_id, channel_id) DO NOTHING"#,
            )
            .bind(user_id)
            .bind(channel_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::storage("insert relation", e))?;

            if inserted.rows_affected() > 0 {
                added.push((*handle).clone());
            } else {
                already.push((*handle).clone());
            }
        }

        tx.commit()
            .await
            .map_err(|e| Error::storage("commit transaction", e))?;

        Ok((added, already, rejected))
    }

    /// Remove one channel relation. Returns whether a relation was removed.
    pub async fn remove_channel_for_user(
        &self,
        tg_user_id: i64,
        handle: &ChannelHandle,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"DELETE FROM user_channels
               WHERE user_id = (SELECT id FROM users WHERE tg_user_id = ?)
                 AND channel_id = (SELECT id FROM channels WHERE handle = ?)"#,
        )
        .bind(tg_user_id)
        .bind(handle.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::storage("remove channel", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Idempotently persist posts for one channel.
    ///
    /// Returns `(inserted, skipped)`; re-running with the same posts inserts
    /// nothing.
    pub async fn upsert_posts(
        &self,
        channel: &ChannelHandle,
        posts: &[Post],
    ) -> Result<(usize, usize)> {
        if posts.is_empty() {
            return Ok((0, 0));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::storage("begin transaction", e))?;

        let channel_id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO channels (handle) VALUES (?)
               ON CONFLICT(handle) DO UPDATE SET handle = excluded.handle
               RETURNING id"#,
        )
        .bind(channel.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Error::storage("upsert channel", e))?;

        let mut inserted = 0usize;
        for post in posts {
            let result = sqlx::query(
                r#"INSERT INTO posts (channel_id, msg_id, date, text, permalink)
                   VALUES (?, ?, ?, ?, ?)
                   ON CONFLICT(channel_id, msg_id) DO NOTHING"#,
            )
            .bind(channel_id)
            .bind(post.msg_id)
            .bind(post.date.timestamp())
            .bind(&post.text)
            .bind(&post.permalink)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::storage("insert post", e))?;

            if result.rows_affected() > 0 {
                inserted += 1;
            }
        }

        tx.commit()
            .await
            .map_err(|e| Error::storage("commit transaction", e))?;

        Ok((inserted, posts.len() - inserted))
    }

    /// Latest stored posts for a channel, returned chronological ascending.
    pub async fn get_last_posts(
        &self,
        channel: &ChannelHandle,
        limit: usize,
    ) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"SELECT c.handle, p.msg_id, p.date, p.text, p.permalink
               FROM channels c
               JOIN posts p ON p.channel_id = c.id
               WHERE c.handle = ?
               ORDER BY p.date DESC
               LIMIT ?"#,
        )
        .bind(channel.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::storage("load posts", e))?;

        let mut posts = rows
            .into_iter()
            .map(PostRow::into_post)
            .collect::<Result<Vec<_>>>()?;
        posts.reverse();
        Ok(posts)
    }
}
