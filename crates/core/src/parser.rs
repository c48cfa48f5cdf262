//! Recursive-descent/Pratt parser (§4.12), producing the [`crate::ast`] tree.
//!
//! Grammar and error-recovery strategy are not a contractual surface (§1 Out of scope);
//! this exists so the crate is buildable and testable end to end. Precedence climbs
//! assignment -> or -> and -> equality -> comparison -> term -> factor -> unary -> call
//! -> primary, the familiar Pratt ladder.

use std::rc::Rc;

use crate::ast::{BinaryOp, ClassDecl, Expr, FunctionDecl, Literal, LogicalOp, Stmt, UnaryOp, VarRef};
use crate::error::{CodeLoc, LoxError, RunResult};
use crate::lexer::{Lexer, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

/// Lexes and parses `source` into a program, a flat list of top-level statements.
pub fn parse(source: &str) -> RunResult<Vec<Stmt>> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser { tokens, pos: 0 }.parse_program()
}

impl Parser {
    fn parse_program(&mut self) -> RunResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::Eof) {
            stmts.push(self.declaration()?);
        }
        Ok(stmts)
    }

    // --- token stream helpers -------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn at(&self) -> CodeLoc {
        self.peek().at
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if !matches!(t.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        t
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> RunResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(LoxError::syntax(format!("Expected {what}."), self.at()))
        }
    }

    fn expect_ident(&mut self, what: &str) -> RunResult<String> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(LoxError::syntax(format!("Expected {what}."), self.at())),
        }
    }

    // --- statements -------------------------------------------------------------

    fn declaration(&mut self) -> RunResult<Stmt> {
        if self.matches(&TokenKind::Var) {
            return self.var_decl();
        }
        if self.matches(&TokenKind::Fun) {
            return self.function_decl();
        }
        if self.matches(&TokenKind::Class) {
            return self.class_decl();
        }
        self.statement()
    }

    fn var_decl(&mut self) -> RunResult<Stmt> {
        let name = self.expect_ident("a variable name")?;
        let init = if self.matches(&TokenKind::Equal) { Some(self.expression()?) } else { None };
        self.expect(&TokenKind::Semicolon, "';' after variable declaration")?;
        Ok(Stmt::VarDecl(name, init))
    }

    fn function_decl(&mut self) -> RunResult<Stmt> {
        let name = self.expect_ident("a function name")?;
        let decl = self.function_body(name)?;
        Ok(Stmt::FunctionDecl(Rc::new(decl)))
    }

    fn function_body(&mut self, name: String) -> RunResult<FunctionDecl> {
        self.expect(&TokenKind::LeftParen, "'(' after function name")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                params.push(self.expect_ident("a parameter name")?);
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RightParen, "')' after parameters")?;
        self.expect(&TokenKind::LeftBrace, "'{' before function body")?;
        let body = self.block_stmts()?;
        Ok(FunctionDecl { name, params, body, is_initializer: false })
    }

    fn class_decl(&mut self) -> RunResult<Stmt> {
        let name = self.expect_ident("a class name")?;
        let superclass = if self.matches(&TokenKind::Less) {
            let super_name = self.expect_ident("a superclass name")?;
            Some(Rc::new(VarRef::new(super_name)))
        } else {
            None
        };
        self.expect(&TokenKind::LeftBrace, "'{' before class body")?;
        let mut methods = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.check(&TokenKind::Eof) {
            let mname = self.expect_ident("a method name")?;
            let is_initializer = mname == "init";
            let mut decl = self.function_body(mname)?;
            decl.is_initializer = is_initializer;
            methods.push(Rc::new(decl));
        }
        self.expect(&TokenKind::RightBrace, "'}' after class body")?;
        Ok(Stmt::ClassDecl(Rc::new(ClassDecl { name, superclass, methods })))
    }

    fn statement(&mut self) -> RunResult<Stmt> {
        if self.matches(&TokenKind::Print) {
            let at = self.at();
            let value = self.expression()?;
            self.expect(&TokenKind::Semicolon, "';' after value")?;
            return Ok(Stmt::Print(value, at));
        }
        if self.matches(&TokenKind::LeftBrace) {
            return Ok(Stmt::Block(self.block_stmts()?));
        }
        if self.matches(&TokenKind::If) {
            return self.if_stmt();
        }
        if self.matches(&TokenKind::While) {
            return self.while_stmt();
        }
        if self.matches(&TokenKind::For) {
            return self.for_stmt();
        }
        if self.matches(&TokenKind::Return) {
            let at = self.at();
            let value = if self.check(&TokenKind::Semicolon) { None } else { Some(self.expression()?) };
            self.expect(&TokenKind::Semicolon, "';' after return value")?;
            return Ok(Stmt::Return(value, at));
        }
        if self.matches(&TokenKind::Break) {
            self.expect(&TokenKind::Semicolon, "';' after 'break'")?;
            return Ok(Stmt::Break);
        }
        if self.matches(&TokenKind::Continue) {
            self.expect(&TokenKind::Semicolon, "';' after 'continue'")?;
            return Ok(Stmt::Continue);
        }
        self.expression_stmt()
    }

    fn block_stmts(&mut self) -> RunResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.check(&TokenKind::Eof) {
            stmts.push(self.declaration()?);
        }
        self.expect(&TokenKind::RightBrace, "'}' after block")?;
        Ok(stmts)
    }

    fn if_stmt(&mut self) -> RunResult<Stmt> {
        self.expect(&TokenKind::LeftParen, "'(' after 'if'")?;
        let cond = self.expression()?;
        self.expect(&TokenKind::RightParen, "')' after condition")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch =
            if self.matches(&TokenKind::Else) { Some(Box::new(self.statement()?)) } else { None };
        Ok(Stmt::If(cond, then_branch, else_branch))
    }

    fn while_stmt(&mut self) -> RunResult<Stmt> {
        self.expect(&TokenKind::LeftParen, "'(' after 'while'")?;
        let cond = self.expression()?;
        self.expect(&TokenKind::RightParen, "')' after condition")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While(cond, body))
    }

    fn for_stmt(&mut self) -> RunResult<Stmt> {
        self.expect(&TokenKind::LeftParen, "'(' after 'for'")?;
        let init = if self.matches(&TokenKind::Semicolon) {
            None
        } else if self.matches(&TokenKind::Var) {
            Some(Box::new(self.var_decl()?))
        } else {
            Some(Box::new(self.expression_stmt()?))
        };
        let condition = if self.check(&TokenKind::Semicolon) { None } else { Some(self.expression()?) };
        self.expect(&TokenKind::Semicolon, "';' after loop condition")?;
        let increment = if self.check(&TokenKind::RightParen) { None } else { Some(self.expression()?) };
        self.expect(&TokenKind::RightParen, "')' after for clauses")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::For { init, condition, increment, body })
    }

    fn expression_stmt(&mut self) -> RunResult<Stmt> {
        let expr = self.expression()?;
        self.expect(&TokenKind::Semicolon, "';' after expression")?;
        Ok(Stmt::Expression(expr))
    }

    // --- expressions --------------------------------------------------------------

    fn expression(&mut self) -> RunResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> RunResult<Expr> {
        let expr = self.or_expr()?;
        if self.matches(&TokenKind::Equal) {
            let at = self.at();
            let value = self.assignment()?;
            return match expr {
                Expr::Variable(var, _) => Ok(Expr::Assign(var, Box::new(value), at)),
                Expr::Get(recv, name, _) => Ok(Expr::Set(recv, name, Box::new(value), at)),
                Expr::Index(recv, idx, _) => Ok(Expr::IndexSet(recv, idx, Box::new(value), at)),
                _ => Err(LoxError::syntax("Invalid assignment target.", at)),
            };
        }
        Ok(expr)
    }

    fn or_expr(&mut self) -> RunResult<Expr> {
        let mut expr = self.and_expr()?;
        while self.matches(&TokenKind::Or) {
            let rhs = self.and_expr()?;
            expr = Expr::Logical(LogicalOp::Or, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn and_expr(&mut self) -> RunResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(&TokenKind::And) {
            let rhs = self.equality()?;
            expr = Expr::Logical(LogicalOp::And, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn equality(&mut self) -> RunResult<Expr> {
        let mut expr = self.comparison()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::BangEqual => BinaryOp::NotEq,
                TokenKind::EqualEqual => BinaryOp::Eq,
                _ => break,
            };
            let at = self.at();
            self.advance();
            let rhs = self.comparison()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs), at);
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> RunResult<Expr> {
        let mut expr = self.term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Greater => BinaryOp::Gt,
                TokenKind::GreaterEqual => BinaryOp::GtEq,
                TokenKind::Less => BinaryOp::Lt,
                TokenKind::LessEqual => BinaryOp::LtEq,
                _ => break,
            };
            let at = self.at();
            self.advance();
            let rhs = self.term()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs), at);
        }
        Ok(expr)
    }

    fn term(&mut self) -> RunResult<Expr> {
        let mut expr = self.factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let at = self.at();
            self.advance();
            let rhs = self.factor()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs), at);
        }
        Ok(expr)
    }

    fn factor(&mut self) -> RunResult<Expr> {
        let mut expr = self.unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            let at = self.at();
            self.advance();
            let rhs = self.unary()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs), at);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> RunResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.call(),
        };
        let at = self.at();
        self.advance();
        let operand = self.unary()?;
        Ok(Expr::Unary(op, Box::new(operand), at))
    }

    fn call(&mut self) -> RunResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.matches(&TokenKind::LeftParen) {
                let at = self.at();
                let args = self.arguments()?;
                expr = Expr::Call(Box::new(expr), args, at);
            } else if self.matches(&TokenKind::Dot) {
                let at = self.at();
                let name = self.expect_ident("a property name after '.'")?;
                expr = Expr::Get(Box::new(expr), name, at);
            } else if self.matches(&TokenKind::LeftBracket) {
                let at = self.at();
                let index = self.expression()?;
                self.expect(&TokenKind::RightBracket, "']' after index")?;
                expr = Expr::Index(Box::new(expr), Box::new(index), at);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn arguments(&mut self) -> RunResult<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                args.push(self.expression()?);
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RightParen, "')' after arguments")?;
        Ok(args)
    }

    fn primary(&mut self) -> RunResult<Expr> {
        let at = self.at();
        match self.peek().kind.clone() {
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(false)))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(true)))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Expr::Literal(Literal::Nil))
            }
            TokenKind::Int(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Int(n)))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Expr::Literal(Literal::Float(f)))
            }
            TokenKind::Str(s, _) => {
                self.advance();
                Ok(Expr::Literal(Literal::Str(s)))
            }
            TokenKind::This => {
                self.advance();
                Ok(Expr::This(at))
            }
            TokenKind::Super => {
                self.advance();
                self.expect(&TokenKind::Dot, "'.' after 'super'")?;
                let method = self.expect_ident("a superclass method name")?;
                Ok(Expr::Super(Rc::new(VarRef::new("super".to_owned())), method, at))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Variable(Rc::new(VarRef::new(name)), at))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(&TokenKind::RightParen, "')' after expression")?;
                Ok(Expr::Grouping(Box::new(expr)))
            }
            TokenKind::LeftBracket => {
                self.advance();
                let mut items = Vec::new();
                if !self.check(&TokenKind::RightBracket) {
                    loop {
                        items.push(self.expression()?);
                        if !self.matches(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&TokenKind::RightBracket, "']' after list literal")?;
                Ok(Expr::ListLiteral(items, at))
            }
            TokenKind::LeftBrace => {
                self.advance();
                let mut pairs = Vec::new();
                if !self.check(&TokenKind::RightBrace) {
                    loop {
                        let key = self.expression()?;
                        self.expect(&TokenKind::Colon, "':' after dict key")?;
                        let value = self.expression()?;
                        pairs.push((key, value));
                        if !self.matches(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&TokenKind::RightBrace, "'}' after dict literal")?;
                Ok(Expr::DictLiteral(pairs, at))
            }
            TokenKind::Fun => {
                self.advance();
                let decl = self.function_body(String::from("<lambda>"))?;
                Ok(Expr::Lambda(Rc::new(decl)))
            }
            _ => Err(LoxError::syntax("Expected an expression.", at)),
        }
    }
}
