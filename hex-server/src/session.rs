//! 会话管理

use std::collections::HashMap;

use protocol::{PlayerId, Role};

use crate::arena::MatchId;

/// 会话：一名已连接参与者的在场状态。
/// 连接建立时创建，断开时销毁。
#[derive(Debug, Clone)]
pub struct Session {
    pub id: PlayerId,
    /// 展示名（joinLobby 之后可用）
    pub username: Option<String>,
    /// 对局内角色（仅绑定对局期间有效）
    pub role: Option<Role>,
    /// 绑定的对局 ID
    pub match_id: Option<MatchId>,
}

impl Session {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            username: None,
            role: None,
            match_id: None,
        }
    }

    /// 是否在对局中
    pub fn in_match(&self) -> bool {
        self.match_id.is_some()
    }

    /// 绑定对局与角色
    pub fn bind_match(&mut self, match_id: MatchId, role: Role) {
        self.match_id = Some(match_id);
        self.role = Some(role);
    }

    /// 清除对局绑定
    pub fn clear_match(&mut self) {
        self.match_id = None;
        self.role = None;
    }
}

/// 会话注册表：身份 -> 在场状态
pub struct SessionRegistry {
    sessions: HashMap<PlayerId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// 连接建立时注册会话
    pub fn register(&mut self, id: PlayerId) {
        self.sessions.entry(id).or_insert_with(|| Session::new(id));
    }

    /// 断开时销毁会话
    pub fn remove(&mut self, id: PlayerId) -> Option<Session> {
        self.sessions.remove(&id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// 检查会话是否存在
    pub fn exists(&self, id: PlayerId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// 获取展示名
    pub fn username(&self, id: PlayerId) -> Option<&str> {
        self.sessions.get(&id).and_then(|s| s.username.as_deref())
    }

    /// 在线会话数
    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_remove() {
        let mut registry = SessionRegistry::new();

        registry.register(1);
        registry.register(2);
        assert_eq!(registry.count(), 2);
        assert!(registry.exists(1));

        // 重复注册不覆盖既有状态
        registry.get_mut(1).unwrap().username = Some("alice".to_string());
        registry.register(1);
        assert_eq!(registry.username(1), Some("alice"));

        registry.remove(1);
        assert!(!registry.exists(1));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_match_binding() {
        let mut session = Session::new(7);
        assert!(!session.in_match());

        session.bind_match(3, Role::Player2);
        assert!(session.in_match());
        assert_eq!(session.match_id, Some(3));
        assert_eq!(session.role, Some(Role::Player2));

        session.clear_match();
        assert!(!session.in_match());
        assert_eq!(session.role, None);
    }
}
