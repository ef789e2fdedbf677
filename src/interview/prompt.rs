//! 提示词：面试官 system 指令、开场消息、轮次包裹、评估评分结构

/// 会话创建时写入历史的第一条 User 消息
pub const OPENING_MESSAGE: &str = "Start the interview with warm small talk.";

/// 评估模型的固定指令：只输出指定结构的 JSON
pub const EVALUATION_INSTRUCTIONS: &str = r#"
You are a professional mock interview evaluator.
Generate ONLY valid JSON in this exact schema:

{
  "text_response": "summary",
  "voice_response": "plain text summary",
  "strengths": "",
  "weaknesses": "",
  "score": 85,
  "communication_score": 80,
  "technical_score": 85,
  "confidence_score": 90,
  "behavior_score": 85,
  "overall_impression": "",
  "recommendations": "",
  "selected": true,
  "end": true
}
"#;

/// 面试参数（创建会话时确定，之后不变）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewSetup {
    pub domain: String,
    pub role: String,
    pub interview_type: String,
    pub difficulty: String,
}

impl InterviewSetup {
    pub const DEFAULT_INTERVIEW_TYPE: &'static str = "Mixed";
    pub const DEFAULT_DIFFICULTY: &'static str = "Intermediate";

    pub fn new(domain: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            role: role.into(),
            interview_type: Self::DEFAULT_INTERVIEW_TYPE.to_string(),
            difficulty: Self::DEFAULT_DIFFICULTY.to_string(),
        }
    }

    pub fn with_interview_type(mut self, interview_type: impl Into<String>) -> Self {
        self.interview_type = interview_type.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = difficulty.into();
        self
    }
}

/// 由面试参数拼出面试官 system 指令
pub fn interviewer_system_prompt(setup: &InterviewSetup) -> String {
    format!(
        r#"
You are AI Interview Practitioner, a friendly but rigorous interviewer running a realistic mock interview.

Interview settings:
- Domain: {domain}
- Role: {role}
- Interview type: {interview_type}
- Difficulty: {difficulty}

How to run the interview:
- Open with brief, warm small talk, then move into the interview.
- Ask exactly one question per turn and wait for the candidate's answer.
- Adapt follow-up questions to the candidate's previous answers and to the difficulty level.
- Mix technical and behavioral questions as the interview type requires.
- Keep each turn short enough to be read aloud comfortably.
- User messages may start with an [INTERNAL] block carrying the exchange number. Use it to pace
  the interview, never mention it, and wrap up politely after roughly ten exchanges.

Reply ONLY with valid JSON in this exact schema:

{{
  "text_response": "what the candidate reads on screen",
  "voice_response": "the same content as plain spoken text, no markdown, no emoji",
  "end": false
}}

Set "end" to true only when the interview is finished.
"#,
        domain = setup.domain,
        role = setup.role,
        interview_type = setup.interview_type,
        difficulty = setup.difficulty,
    )
}

/// 仅对话模型可见的轮次包裹；历史中保存的是原始用户文本
pub fn turn_envelope(exchange: u32, user_text: &str) -> String {
    format!("[INTERNAL]\nExchange: {exchange}\n[END]\nUser: {user_text}")
}

/// 评估请求正文
pub fn evaluation_request(transcript: &str) -> String {
    format!("Transcript:\n{transcript}\nGenerate summary now.")
}
