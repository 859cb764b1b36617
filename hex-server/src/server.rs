//! 服务器主逻辑
//!
//! 所有状态变更都在唯一的调度任务中串行执行：同一对局同一时刻
//! 只有一步在生效，大厅广播反映一致的快照。

use std::collections::HashMap;

use tokio::sync::mpsc;

use protocol::{
    ClientEvent, Listener, PlayerId, ProtocolError, Role, RoleNames, ServerEvent, TcpConnection,
    TcpListener, Winner,
};

use crate::arena::{Match, MatchArena, MatchId};
use crate::lobby::Lobby;
use crate::session::SessionRegistry;

/// 服务器状态
pub struct ServerState {
    pub sessions: SessionRegistry,
    pub lobby: Lobby,
    pub matches: MatchArena,
    /// 参与者 ID -> 出站事件通道
    pub connections: HashMap<PlayerId, mpsc::Sender<ServerEvent>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            sessions: SessionRegistry::new(),
            lobby: Lobby::new(),
            matches: MatchArena::new(),
            connections: HashMap::new(),
        }
    }

    /// 发送事件给指定参与者（连接不存在时静默丢弃）
    pub async fn send_to_player(&self, player_id: PlayerId, ev: ServerEvent) {
        if let Some(tx) = self.connections.get(&player_id) {
            let _ = tx.send(ev).await;
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// 待发送的事件：处理器先收集，状态变更完成后统一下发
struct PendingEvents {
    /// 点对点事件
    messages: Vec<(PlayerId, ServerEvent)>,
    /// 全员广播
    broadcasts: Vec<ServerEvent>,
}

impl PendingEvents {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            broadcasts: Vec::new(),
        }
    }

    fn send(&mut self, player_id: PlayerId, ev: ServerEvent) {
        self.messages.push((player_id, ev));
    }

    /// 发送给仍绑定对局的成员
    fn send_match(&mut self, members: &[PlayerId], ev: ServerEvent) {
        for &member in members {
            self.messages.push((member, ev.clone()));
        }
    }

    fn broadcast(&mut self, ev: ServerEvent) {
        self.broadcasts.push(ev);
    }

    async fn flush(self, state: &ServerState) {
        for (player_id, ev) in self.messages {
            state.send_to_player(player_id, ev).await;
        }
        for ev in self.broadcasts {
            for tx in state.connections.values() {
                let _ = tx.send(ev.clone()).await;
            }
        }
    }
}

/// 事件处理器
pub struct EventHandler;

impl EventHandler {
    /// 处理连接建立：登记出站通道并创建会话
    pub fn handle_connect(
        state: &mut ServerState,
        player_id: PlayerId,
        tx: mpsc::Sender<ServerEvent>,
    ) {
        state.connections.insert(player_id, tx);
        state.sessions.register(player_id);
        tracing::info!(player_id, "客户端已连接");
    }

    /// 处理客户端事件
    pub async fn handle(state: &mut ServerState, player_id: PlayerId, ev: ClientEvent) {
        let mut pending = PendingEvents::new();

        match ev {
            ClientEvent::JoinLobby { username } => {
                Self::handle_join_lobby(state, &mut pending, player_id, username)
            }
            ClientEvent::ChallengePlayer { target_id } => {
                Self::handle_challenge(state, &mut pending, player_id, target_id)
            }
            ClientEvent::AcceptChallenge { challenger_id } => {
                Self::handle_accept(state, &mut pending, player_id, challenger_id)
            }
            ClientEvent::DeclineChallenge { challenger_id } => {
                Self::handle_decline(state, &mut pending, player_id, challenger_id)
            }
            ClientEvent::MakeMove {
                from_cell_id,
                target_cell_id,
                player,
            } => Self::handle_make_move(
                state,
                &mut pending,
                player_id,
                from_cell_id,
                target_cell_id,
                player,
            ),
            ClientEvent::Surrender => Self::handle_surrender(state, &mut pending, player_id),
            ClientEvent::LeaveGame => Self::handle_leave(state, &mut pending, player_id),
            ClientEvent::ResetGame => Self::handle_reset(state, &mut pending, player_id),
        }

        pending.flush(state).await;
    }

    /// 加入大厅：设置展示名，全员广播新名单
    fn handle_join_lobby(
        state: &mut ServerState,
        pending: &mut PendingEvents,
        player_id: PlayerId,
        username: String,
    ) {
        if let Some(session) = state.sessions.get_mut(player_id) {
            session.username = Some(username.clone());
        }
        state.lobby.upsert(player_id, username);
        pending.broadcast(ServerEvent::LobbyUpdate(state.lobby.snapshot()));
    }

    /// 发起挑战：仅通知目标；目标不存在时静默丢弃
    fn handle_challenge(
        state: &mut ServerState,
        pending: &mut PendingEvents,
        player_id: PlayerId,
        target_id: PlayerId,
    ) {
        if !state.sessions.exists(target_id) {
            tracing::debug!(player_id, target_id, "挑战目标不存在，忽略");
            return;
        }
        let challenger_name = state
            .sessions
            .username(player_id)
            .unwrap_or_default()
            .to_string();
        pending.send(
            target_id,
            ServerEvent::ChallengeReceived {
                challenger_id: player_id,
                challenger_name,
            },
        );
    }

    /// 接受挑战：双方离开大厅，创建对局并绑定。
    /// 两份 matchStarted 在任何走子被处理之前送达双方。
    fn handle_accept(
        state: &mut ServerState,
        pending: &mut PendingEvents,
        player_id: PlayerId,
        challenger_id: PlayerId,
    ) {
        if !state.sessions.exists(challenger_id) || !state.sessions.exists(player_id) {
            tracing::debug!(player_id, challenger_id, "挑战方已不在线，忽略");
            return;
        }

        state.lobby.remove(player_id);
        state.lobby.remove(challenger_id);

        let match_id = state.matches.create(challenger_id, player_id);

        if let Some(session) = state.sessions.get_mut(challenger_id) {
            session.bind_match(match_id, Role::Player1);
        }
        if let Some(session) = state.sessions.get_mut(player_id) {
            session.bind_match(match_id, Role::Player2);
        }

        let players = RoleNames {
            player1: state
                .sessions
                .username(challenger_id)
                .unwrap_or_default()
                .to_string(),
            player2: state
                .sessions
                .username(player_id)
                .unwrap_or_default()
                .to_string(),
        };

        let game = match state.matches.get(match_id) {
            Some(m) => m.game.clone(),
            None => return,
        };

        pending.send(
            challenger_id,
            ServerEvent::MatchStarted(protocol::MatchStart {
                state: game.clone(),
                players: players.clone(),
                your_role: Role::Player1,
            }),
        );
        pending.send(
            player_id,
            ServerEvent::MatchStarted(protocol::MatchStart {
                state: game,
                players,
                your_role: Role::Player2,
            }),
        );

        tracing::info!(match_id, challenger_id, accepter = player_id, "对局创建");
    }

    /// 拒绝挑战：仅通知发起方
    fn handle_decline(
        state: &mut ServerState,
        pending: &mut PendingEvents,
        player_id: PlayerId,
        challenger_id: PlayerId,
    ) {
        if state.sessions.exists(challenger_id) {
            pending.send(challenger_id, ServerEvent::ChallengeDeclined { from: player_id });
        }
    }

    /// 走子路由：转发给绑定对局；成功广播给对局成员，失败单发原因
    fn handle_make_move(
        state: &mut ServerState,
        pending: &mut PendingEvents,
        player_id: PlayerId,
        from: protocol::CellId,
        to: protocol::CellId,
        as_role: Role,
    ) {
        let match_id = match state.sessions.get(player_id).and_then(|s| s.match_id) {
            Some(id) => id,
            None => {
                pending.send(
                    player_id,
                    ServerEvent::InvalidMove("No active match".to_string()),
                );
                return;
            }
        };

        let m = match state.matches.get_mut(match_id) {
            Some(m) => m,
            None => {
                pending.send(
                    player_id,
                    ServerEvent::InvalidMove("No active match".to_string()),
                );
                return;
            }
        };

        match m.game.make_move(from, to, as_role) {
            Ok(()) => {
                let recipients = Self::bound_members(&state.sessions, m, match_id);
                pending.send_match(&recipients, ServerEvent::GameState(m.game.clone()));
            }
            Err(e) => {
                tracing::debug!(player_id, reason = %e, "走法被拒绝");
                pending.send(player_id, ServerEvent::InvalidMove(e.to_string()));
            }
        }
    }

    /// 投降：胜者为对方（能解析展示名则用展示名，否则用角色字面量）
    fn handle_surrender(state: &mut ServerState, pending: &mut PendingEvents, player_id: PlayerId) {
        let match_id = match state.sessions.get(player_id).and_then(|s| s.match_id) {
            Some(id) => id,
            None => return,
        };

        let (opponent_id, my_role) = match state.matches.get(match_id) {
            Some(m) if !m.game.game_over => (m.opponent_of(player_id), m.role_of(player_id)),
            _ => return,
        };
        let my_role = match my_role {
            Some(role) => role,
            None => return,
        };

        let winner = Self::resolve_winner(state, opponent_id, my_role.opponent());
        if let Some(m) = state.matches.get_mut(match_id) {
            if m.game.surrender(winner) {
                let recipients = Self::bound_members(&state.sessions, m, match_id);
                pending.send_match(&recipients, ServerEvent::GameState(m.game.clone()));
                tracing::info!(match_id, player_id, "投降");
            }
        }
    }

    /// 离开对局：未结束则判留守方胜并只通知留守方；
    /// 离开者清除绑定、回到大厅并广播名单
    fn handle_leave(state: &mut ServerState, pending: &mut PendingEvents, player_id: PlayerId) {
        let match_id = match state.sessions.get(player_id).and_then(|s| s.match_id) {
            Some(id) => id,
            None => return,
        };

        let (opponent_id, my_role) = match state.matches.get(match_id) {
            Some(m) => (m.opponent_of(player_id), m.role_of(player_id)),
            None => (None, None),
        };

        if let Some(role) = my_role {
            let winner = Self::resolve_winner(state, opponent_id, role.opponent());
            if let Some(m) = state.matches.get_mut(match_id) {
                if m.game.mark_opponent_left(winner) {
                    if let Some(opponent_id) = opponent_id {
                        pending.send(opponent_id, ServerEvent::GameState(m.game.clone()));
                    }
                    tracing::info!(match_id, player_id, "离开对局");
                }
            }
        }

        let username = match state.sessions.get_mut(player_id) {
            Some(session) => {
                session.clear_match();
                session.username.clone().unwrap_or_default()
            }
            None => return,
        };
        Self::collect_match(state, match_id);

        state.lobby.upsert(player_id, username);
        pending.broadcast(ServerEvent::LobbyUpdate(state.lobby.snapshot()));
    }

    /// 重置对局：任一成员任意时刻可发起，重置后广播给对局成员
    fn handle_reset(state: &mut ServerState, pending: &mut PendingEvents, player_id: PlayerId) {
        let match_id = match state.sessions.get(player_id).and_then(|s| s.match_id) {
            Some(id) => id,
            None => return,
        };

        if let Some(m) = state.matches.get_mut(match_id) {
            m.game.reset();
            let recipients = Self::bound_members(&state.sessions, m, match_id);
            pending.send_match(&recipients, ServerEvent::GameState(m.game.clone()));
            tracing::info!(match_id, player_id, "对局重置");
        }
    }

    /// 处理断开：移出大厅并销毁会话；绑定中的对局不在此结算，
    /// 留守方仍可投降或离开
    pub async fn handle_disconnect(state: &mut ServerState, player_id: PlayerId) {
        let mut pending = PendingEvents::new();

        state.connections.remove(&player_id);
        state.lobby.remove(player_id);

        let match_id = state.sessions.remove(player_id).and_then(|s| s.match_id);
        if let Some(match_id) = match_id {
            Self::collect_match(state, match_id);
        }

        pending.broadcast(ServerEvent::LobbyUpdate(state.lobby.snapshot()));
        pending.flush(state).await;

        tracing::info!(player_id, "客户端断开");
    }

    /// 胜者解析：优先对方展示名，回退角色字面量
    fn resolve_winner(
        state: &ServerState,
        opponent_id: Option<PlayerId>,
        opponent_role: Role,
    ) -> Winner {
        opponent_id
            .and_then(|id| state.sessions.username(id))
            .map(|name| Winner::Name(name.to_string()))
            .unwrap_or(Winner::Role(opponent_role))
    }

    /// 仍绑定该对局的成员（已离开或已断开的一方不再接收对局广播）
    fn bound_members(
        sessions: &SessionRegistry,
        m: &Match,
        match_id: MatchId,
    ) -> Vec<PlayerId> {
        m.members()
            .into_iter()
            .filter(|&id| {
                sessions
                    .get(id)
                    .map_or(false, |s| s.match_id == Some(match_id))
            })
            .collect()
    }

    /// 双方会话都不再引用时回收对局
    fn collect_match(state: &mut ServerState, match_id: MatchId) {
        let referenced = match state.matches.get(match_id) {
            Some(m) => m.members().iter().any(|&id| {
                state
                    .sessions
                    .get(id)
                    .map_or(false, |s| s.match_id == Some(match_id))
            }),
            None => return,
        };
        if !referenced {
            state.matches.remove(match_id);
            tracing::debug!(match_id, "对局已回收");
        }
    }
}

// ============================================================================
// 连接调度
// ============================================================================

/// 入站事件（连接任务 -> 调度任务）
pub enum Inbound {
    /// 新连接建立（携带出站通道）
    Connected(mpsc::Sender<ServerEvent>),
    /// 客户端事件
    Event(ClientEvent),
    /// 连接断开
    Disconnected,
}

/// 运行服务器：接受连接，事件统一汇入调度任务串行处理
pub async fn run(addr: &str) -> anyhow::Result<()> {
    let mut listener = TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %listener.local_addr().unwrap_or_default(),
        "服务器监听中"
    );

    let (inbound_tx, inbound_rx) = mpsc::channel::<(PlayerId, Inbound)>(256);
    tokio::spawn(dispatch(inbound_rx));

    let mut next_id: PlayerId = 1;
    loop {
        let conn = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "接受连接失败");
                continue;
            }
        };
        let player_id = next_id;
        next_id += 1;
        tokio::spawn(serve_connection(player_id, conn, inbound_tx.clone()));
    }
}

/// 调度循环：唯一属主 ServerState
async fn dispatch(mut rx: mpsc::Receiver<(PlayerId, Inbound)>) {
    let mut state = ServerState::new();

    while let Some((player_id, inbound)) = rx.recv().await {
        match inbound {
            Inbound::Connected(tx) => EventHandler::handle_connect(&mut state, player_id, tx),
            Inbound::Event(ev) => EventHandler::handle(&mut state, player_id, ev).await,
            Inbound::Disconnected => EventHandler::handle_disconnect(&mut state, player_id).await,
        }
    }
}

/// 单连接服务：登记出站通道，读帧并转发给调度任务
async fn serve_connection(
    player_id: PlayerId,
    conn: TcpConnection,
    inbound: mpsc::Sender<(PlayerId, Inbound)>,
) {
    let (mut reader, mut writer) = conn.split();

    let (tx, mut rx) = mpsc::channel::<ServerEvent>(64);
    if inbound
        .send((player_id, Inbound::Connected(tx)))
        .await
        .is_err()
    {
        return;
    }

    // 写任务：把调度任务产出的事件写回客户端
    let write_task = tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            if writer.write_frame(&ev).await.is_err() {
                break;
            }
        }
    });

    // 读循环：解析客户端事件
    loop {
        match reader.read_frame::<ClientEvent>().await {
            Ok(ev) => {
                if inbound.send((player_id, Inbound::Event(ev))).await.is_err() {
                    break;
                }
            }
            Err(ProtocolError::ConnectionClosed) => break,
            Err(e) => {
                tracing::debug!(player_id, error = %e, "读取失败，断开连接");
                break;
            }
        }
    }

    let _ = inbound.send((player_id, Inbound::Disconnected)).await;
    write_task.abort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{Board, CellId, Game, MatchStart};

    /// 模拟一条连接：注册出站通道并返回接收端
    fn connect(state: &mut ServerState, id: PlayerId) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(64);
        EventHandler::handle_connect(state, id, tx);
        rx
    }

    fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    fn id_at(q: i32, r: i32) -> CellId {
        Board::new().cell_at(q, r).unwrap().id
    }

    /// 建好一场 alice(1, player1) 对 bob(2, player2) 的对局并清空事件
    async fn start_match(
        state: &mut ServerState,
    ) -> (mpsc::Receiver<ServerEvent>, mpsc::Receiver<ServerEvent>) {
        let mut rx1 = connect(state, 1);
        let mut rx2 = connect(state, 2);

        EventHandler::handle(
            state,
            1,
            ClientEvent::JoinLobby {
                username: "alice".to_string(),
            },
        )
        .await;
        EventHandler::handle(
            state,
            2,
            ClientEvent::JoinLobby {
                username: "bob".to_string(),
            },
        )
        .await;
        EventHandler::handle(state, 1, ClientEvent::ChallengePlayer { target_id: 2 }).await;
        EventHandler::handle(state, 2, ClientEvent::AcceptChallenge { challenger_id: 1 }).await;

        drain(&mut rx1);
        drain(&mut rx2);
        (rx1, rx2)
    }

    #[tokio::test]
    async fn test_join_lobby_broadcasts_snapshot() {
        let mut state = ServerState::new();
        let mut rx1 = connect(&mut state, 1);
        let mut rx2 = connect(&mut state, 2);

        EventHandler::handle(
            &mut state,
            1,
            ClientEvent::JoinLobby {
                username: "alice".to_string(),
            },
        )
        .await;
        EventHandler::handle(
            &mut state,
            2,
            ClientEvent::JoinLobby {
                username: "bob".to_string(),
            },
        )
        .await;

        // 两名参与者都收到两次全量名单
        let events1 = drain(&mut rx1);
        assert_eq!(events1.len(), 2);
        match events1.last().unwrap() {
            ServerEvent::LobbyUpdate(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].username, "alice");
                assert_eq!(entries[1].username, "bob");
            }
            other => panic!("Unexpected event: {:?}", other),
        }
        assert_eq!(drain(&mut rx2).len(), 2);
    }

    #[tokio::test]
    async fn test_join_lobby_upsert_keeps_single_entry() {
        let mut state = ServerState::new();
        let mut rx1 = connect(&mut state, 1);

        EventHandler::handle(
            &mut state,
            1,
            ClientEvent::JoinLobby {
                username: "alice".to_string(),
            },
        )
        .await;
        EventHandler::handle(
            &mut state,
            1,
            ClientEvent::JoinLobby {
                username: "alice2".to_string(),
            },
        )
        .await;

        let events = drain(&mut rx1);
        match events.last().unwrap() {
            ServerEvent::LobbyUpdate(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].username, "alice2");
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_challenge_delivered_to_target_only() {
        let mut state = ServerState::new();
        let mut rx1 = connect(&mut state, 1);
        let mut rx2 = connect(&mut state, 2);

        EventHandler::handle(
            &mut state,
            1,
            ClientEvent::JoinLobby {
                username: "alice".to_string(),
            },
        )
        .await;
        drain(&mut rx1);
        drain(&mut rx2);

        EventHandler::handle(&mut state, 1, ClientEvent::ChallengePlayer { target_id: 2 }).await;

        assert!(drain(&mut rx1).is_empty());
        let events = drain(&mut rx2);
        assert_eq!(
            events,
            vec![ServerEvent::ChallengeReceived {
                challenger_id: 1,
                challenger_name: "alice".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_challenge_unknown_target_silently_dropped() {
        let mut state = ServerState::new();
        let mut rx1 = connect(&mut state, 1);

        EventHandler::handle(&mut state, 1, ClientEvent::ChallengePlayer { target_id: 99 }).await;

        // 发起方收不到任何反馈
        assert!(drain(&mut rx1).is_empty());
    }

    #[tokio::test]
    async fn test_accept_creates_match_with_fixed_roles() {
        let mut state = ServerState::new();
        let mut rx1 = connect(&mut state, 1);
        let mut rx2 = connect(&mut state, 2);

        EventHandler::handle(
            &mut state,
            1,
            ClientEvent::JoinLobby {
                username: "alice".to_string(),
            },
        )
        .await;
        EventHandler::handle(
            &mut state,
            2,
            ClientEvent::JoinLobby {
                username: "bob".to_string(),
            },
        )
        .await;
        EventHandler::handle(&mut state, 1, ClientEvent::ChallengePlayer { target_id: 2 }).await;
        drain(&mut rx1);
        drain(&mut rx2);

        EventHandler::handle(&mut state, 2, ClientEvent::AcceptChallenge { challenger_id: 1 }).await;

        // 发起方是 player1
        let events1 = drain(&mut rx1);
        match events1.as_slice() {
            [ServerEvent::MatchStarted(MatchStart {
                state: game,
                players,
                your_role,
            })] => {
                assert_eq!(*your_role, Role::Player1);
                assert_eq!(players.player1, "alice");
                assert_eq!(players.player2, "bob");
                assert_eq!(*game, Game::new());
            }
            other => panic!("Unexpected events: {:?}", other),
        }

        // 接受方是 player2
        let events2 = drain(&mut rx2);
        match events2.as_slice() {
            [ServerEvent::MatchStarted(MatchStart { your_role, .. })] => {
                assert_eq!(*your_role, Role::Player2);
            }
            other => panic!("Unexpected events: {:?}", other),
        }

        // 双方都已离开大厅，会话绑定同一对局
        assert!(state.lobby.is_empty());
        let m1 = state.sessions.get(1).unwrap().match_id.unwrap();
        let m2 = state.sessions.get(2).unwrap().match_id.unwrap();
        assert_eq!(m1, m2);
        assert_eq!(state.matches.count(), 1);
    }

    #[tokio::test]
    async fn test_decline_notifies_challenger_only() {
        let mut state = ServerState::new();
        let mut rx1 = connect(&mut state, 1);
        let mut rx2 = connect(&mut state, 2);

        EventHandler::handle(&mut state, 2, ClientEvent::DeclineChallenge { challenger_id: 1 })
            .await;

        assert_eq!(
            drain(&mut rx1),
            vec![ServerEvent::ChallengeDeclined { from: 2 }]
        );
        assert!(drain(&mut rx2).is_empty());
    }

    #[tokio::test]
    async fn test_move_without_match_rejected() {
        let mut state = ServerState::new();
        let mut rx1 = connect(&mut state, 1);

        EventHandler::handle(
            &mut state,
            1,
            ClientEvent::MakeMove {
                from_cell_id: 0,
                target_cell_id: 1,
                player: Role::Player1,
            },
        )
        .await;

        assert_eq!(
            drain(&mut rx1),
            vec![ServerEvent::InvalidMove("No active match".to_string())]
        );
    }

    #[tokio::test]
    async fn test_move_broadcasts_to_both_members() {
        let mut state = ServerState::new();
        let (mut rx1, mut rx2) = start_match(&mut state).await;

        let from = id_at(-4, 0);
        let to = id_at(-3, 0);
        EventHandler::handle(
            &mut state,
            1,
            ClientEvent::MakeMove {
                from_cell_id: from,
                target_cell_id: to,
                player: Role::Player1,
            },
        )
        .await;

        for rx in [&mut rx1, &mut rx2] {
            let events = drain(rx);
            match events.as_slice() {
                [ServerEvent::GameState(game)] => {
                    // 距离 1 的走法：原格保留，终点归 player1，轮到 player2
                    assert_eq!(game.board.cell(from).unwrap().player, Some(Role::Player1));
                    assert_eq!(game.board.cell(to).unwrap().player, Some(Role::Player1));
                    assert_eq!(game.current_player, Role::Player2);
                }
                other => panic!("Unexpected events: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_invalid_move_reported_to_sender_only() {
        let mut state = ServerState::new();
        let (mut rx1, mut rx2) = start_match(&mut state).await;

        EventHandler::handle(
            &mut state,
            2,
            ClientEvent::MakeMove {
                from_cell_id: id_at(-4, 0),
                target_cell_id: id_at(-3, 0),
                player: Role::Player2,
            },
        )
        .await;

        assert_eq!(
            drain(&mut rx2),
            vec![ServerEvent::InvalidMove("Not your piece".to_string())]
        );
        assert!(drain(&mut rx1).is_empty());
    }

    #[tokio::test]
    async fn test_surrender_awards_opponent_by_name() {
        let mut state = ServerState::new();
        let (mut rx1, mut rx2) = start_match(&mut state).await;

        EventHandler::handle(&mut state, 2, ClientEvent::Surrender).await;

        for rx in [&mut rx1, &mut rx2] {
            let events = drain(rx);
            match events.as_slice() {
                [ServerEvent::GameState(game)] => {
                    assert!(game.game_over);
                    assert!(!game.opponent_left);
                    assert_eq!(game.winner, Some(Winner::Name("alice".to_string())));
                    // 投降不动棋盘
                    assert_eq!(game.board, Game::new().board);
                }
                other => panic!("Unexpected events: {:?}", other),
            }
        }

        // 已结束的对局再投降不再广播
        EventHandler::handle(&mut state, 1, ClientEvent::Surrender).await;
        assert!(drain(&mut rx1).is_empty());
        assert!(drain(&mut rx2).is_empty());
    }

    #[tokio::test]
    async fn test_leave_notifies_remaining_member_and_rejoins_lobby() {
        let mut state = ServerState::new();
        let (mut rx1, mut rx2) = start_match(&mut state).await;

        EventHandler::handle(&mut state, 2, ClientEvent::LeaveGame).await;

        // 留守方：对方离开 + 判胜，然后收到大厅广播
        let events1 = drain(&mut rx1);
        match events1.as_slice() {
            [ServerEvent::GameState(game), ServerEvent::LobbyUpdate(entries)] => {
                assert!(game.game_over);
                assert!(game.opponent_left);
                assert_eq!(game.winner, Some(Winner::Name("alice".to_string())));
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].id, 2);
                assert_eq!(entries[0].username, "bob");
            }
            other => panic!("Unexpected events: {:?}", other),
        }

        // 离开方只收到大厅广播，不再收对局快照
        let events2 = drain(&mut rx2);
        assert_eq!(events2.len(), 1);
        assert!(matches!(events2[0], ServerEvent::LobbyUpdate(_)));

        // 离开方绑定已清除，留守方仍然绑定
        assert!(!state.sessions.get(2).unwrap().in_match());
        assert!(state.sessions.get(1).unwrap().in_match());
        assert_eq!(state.matches.count(), 1);

        // 留守方重置对局，离开方不再收到对局快照
        EventHandler::handle(&mut state, 1, ClientEvent::ResetGame).await;
        assert_eq!(drain(&mut rx1).len(), 1);
        assert!(drain(&mut rx2).is_empty());
    }

    #[tokio::test]
    async fn test_reset_reinitializes_match() {
        let mut state = ServerState::new();
        let (mut rx1, mut rx2) = start_match(&mut state).await;

        EventHandler::handle(
            &mut state,
            1,
            ClientEvent::MakeMove {
                from_cell_id: id_at(-4, 0),
                target_cell_id: id_at(-2, 0),
                player: Role::Player1,
            },
        )
        .await;
        EventHandler::handle(&mut state, 2, ClientEvent::Surrender).await;
        drain(&mut rx1);
        drain(&mut rx2);

        // 终局后任一成员都可重置
        EventHandler::handle(&mut state, 2, ClientEvent::ResetGame).await;

        for rx in [&mut rx1, &mut rx2] {
            let events = drain(rx);
            match events.as_slice() {
                [ServerEvent::GameState(game)] => assert_eq!(*game, Game::new()),
                other => panic!("Unexpected events: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_disconnect_cleans_lobby_and_session() {
        let mut state = ServerState::new();
        let mut rx1 = connect(&mut state, 1);
        let mut rx2 = connect(&mut state, 2);

        EventHandler::handle(
            &mut state,
            1,
            ClientEvent::JoinLobby {
                username: "alice".to_string(),
            },
        )
        .await;
        EventHandler::handle(
            &mut state,
            2,
            ClientEvent::JoinLobby {
                username: "bob".to_string(),
            },
        )
        .await;
        drain(&mut rx1);
        drain(&mut rx2);

        EventHandler::handle_disconnect(&mut state, 1).await;

        assert!(!state.sessions.exists(1));
        assert!(!state.lobby.contains(1));

        let events2 = drain(&mut rx2);
        match events2.as_slice() {
            [ServerEvent::LobbyUpdate(entries)] => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].id, 2);
            }
            other => panic!("Unexpected events: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_disconnect_does_not_resolve_bound_match() {
        let mut state = ServerState::new();
        let (mut rx1, _rx2) = start_match(&mut state).await;

        EventHandler::handle_disconnect(&mut state, 2).await;

        // 留守方未收到对局快照：断开不触发对方离开语义
        let events1 = drain(&mut rx1);
        assert!(events1.iter().all(|ev| matches!(ev, ServerEvent::LobbyUpdate(_))));

        // 对局仍被留守方引用，未回收、未结束
        let match_id = state.sessions.get(1).unwrap().match_id.unwrap();
        assert!(!state.matches.get(match_id).unwrap().game.game_over);

        // 留守方离开后对局无人引用，被回收
        EventHandler::handle(&mut state, 1, ClientEvent::LeaveGame).await;
        assert_eq!(state.matches.count(), 0);
    }
}
